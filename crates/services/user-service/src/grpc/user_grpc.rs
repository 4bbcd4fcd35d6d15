//! gRPC implementation for UserService.

use tonic::{Request, Response, Status};

use common::AppError;
use domain::DomainError;
use proto::user::v1::{self as pb, user_service_server::UserService as UserServiceProto};

use super::interceptor::InterceptorChain;
use super::mapper;
use crate::usecase::{AuthenticateDto, ChangePasswordDto, SearchUsersDto, UserUseCase};

const CREATE_USER: &str = "/user.v1.UserService/CreateUser";
const GET_USER: &str = "/user.v1.UserService/GetUser";
const LIST_USERS: &str = "/user.v1.UserService/ListUsers";
const UPDATE_USER: &str = "/user.v1.UserService/UpdateUser";
const DELETE_USER: &str = "/user.v1.UserService/DeleteUser";
const BATCH_GET_USERS: &str = "/user.v1.UserService/BatchGetUsers";
const SEARCH_USERS: &str = "/user.v1.UserService/SearchUsers";
const CHANGE_PASSWORD: &str = "/user.v1.UserService/ChangePassword";
const AUTHENTICATE_USER: &str = "/user.v1.UserService/AuthenticateUser";

/// gRPC service wrapper for the user use cases.
pub struct UserGrpcService {
    usecase: UserUseCase,
    chain: InterceptorChain,
}

impl UserGrpcService {
    /// Create a new gRPC service wrapper.
    pub fn new(usecase: UserUseCase, chain: InterceptorChain) -> Self {
        Self { usecase, chain }
    }
}

#[tonic::async_trait]
impl UserServiceProto for UserGrpcService {
    async fn create_user(
        &self,
        request: Request<pb::CreateUserRequest>,
    ) -> Result<Response<pb::CreateUserResponse>, Status> {
        self.chain
            .unary(CREATE_USER, request, |request| async move {
                let dto = mapper::create_request_to_dto(request.into_inner());
                let user = self.usecase.create_user(dto).await?;
                Ok(Response::new(pb::CreateUserResponse {
                    user: Some(mapper::user_to_proto(&user)),
                }))
            })
            .await
    }

    async fn get_user(
        &self,
        request: Request<pb::GetUserRequest>,
    ) -> Result<Response<pb::GetUserResponse>, Status> {
        self.chain
            .unary(GET_USER, request, |request| async move {
                let user = self.usecase.get_user(&request.get_ref().id).await?;
                Ok(Response::new(pb::GetUserResponse {
                    user: Some(mapper::user_to_proto(&user)),
                }))
            })
            .await
    }

    async fn list_users(
        &self,
        request: Request<pb::ListUsersRequest>,
    ) -> Result<Response<pb::ListUsersResponse>, Status> {
        self.chain
            .unary(LIST_USERS, request, |request| async move {
                let req = request.into_inner();
                let (page, page_size) = mapper::pagination(req.pagination.as_ref());
                let filter = req.filter.map(mapper::filter_to_dto);

                let list = self.usecase.list_users(page, page_size, filter).await?;
                Ok(Response::new(pb::ListUsersResponse {
                    users: mapper::users_to_proto(&list),
                    pagination: Some(mapper::pagination_to_proto(&list)),
                }))
            })
            .await
    }

    async fn update_user(
        &self,
        request: Request<pb::UpdateUserRequest>,
    ) -> Result<Response<pb::UpdateUserResponse>, Status> {
        self.chain
            .unary(UPDATE_USER, request, |request| async move {
                let dto = mapper::update_request_to_dto(request.into_inner())?;
                let user = self.usecase.update_user(dto).await?;
                Ok(Response::new(pb::UpdateUserResponse {
                    user: Some(mapper::user_to_proto(&user)),
                }))
            })
            .await
    }

    async fn delete_user(
        &self,
        request: Request<pb::DeleteUserRequest>,
    ) -> Result<Response<pb::DeleteUserResponse>, Status> {
        self.chain
            .unary(DELETE_USER, request, |request| async move {
                let req = request.into_inner();
                self.usecase.delete_user(&req.id, req.hard_delete).await?;
                Ok(Response::new(pb::DeleteUserResponse {
                    success: true,
                    message: "User deleted successfully".to_string(),
                }))
            })
            .await
    }

    async fn batch_get_users(
        &self,
        request: Request<pb::BatchGetUsersRequest>,
    ) -> Result<Response<pb::BatchGetUsersResponse>, Status> {
        self.chain
            .unary(BATCH_GET_USERS, request, |request| async move {
                let (users, not_found) = self
                    .usecase
                    .batch_get_users(&request.get_ref().ids)
                    .await?;
                Ok(Response::new(pb::BatchGetUsersResponse {
                    users: users
                        .iter()
                        .map(|(id, user)| (id.clone(), mapper::user_to_proto(user)))
                        .collect(),
                    not_found,
                }))
            })
            .await
    }

    async fn search_users(
        &self,
        request: Request<pb::SearchUsersRequest>,
    ) -> Result<Response<pb::SearchUsersResponse>, Status> {
        self.chain
            .unary(SEARCH_USERS, request, |request| async move {
                let req = request.into_inner();
                let (page, page_size) = mapper::pagination(req.pagination.as_ref());
                let dto = SearchUsersDto {
                    query: req.query,
                    page,
                    page_size,
                    filter: req.filter.map(mapper::filter_to_dto),
                };

                let list = self.usecase.search_users(dto).await?;
                let pagination = mapper::pagination_to_proto(&list);
                Ok(Response::new(pb::SearchUsersResponse {
                    users: mapper::users_to_proto(&list),
                    total_matches: pagination.total_items,
                    pagination: Some(pagination),
                }))
            })
            .await
    }

    async fn change_password(
        &self,
        request: Request<pb::ChangePasswordRequest>,
    ) -> Result<Response<pb::ChangePasswordResponse>, Status> {
        self.chain
            .unary(CHANGE_PASSWORD, request, |request| async move {
                let req = request.into_inner();
                let user_id = uuid::Uuid::parse_str(&req.user_id)
                    .map_err(|_| Status::invalid_argument("invalid user_id"))?;

                self.usecase
                    .change_password(ChangePasswordDto {
                        user_id,
                        old_password: req.old_password,
                        new_password: req.new_password,
                    })
                    .await?;
                Ok(Response::new(pb::ChangePasswordResponse {
                    success: true,
                    message: "Password changed successfully".to_string(),
                }))
            })
            .await
    }

    /// Credential-class failures are reported in the body, not as a status.
    async fn authenticate_user(
        &self,
        request: Request<pb::AuthenticateUserRequest>,
    ) -> Result<Response<pb::AuthenticateUserResponse>, Status> {
        self.chain
            .unary(AUTHENTICATE_USER, request, |request| async move {
                let req = request.into_inner();
                let dto = AuthenticateDto {
                    identifier: req.identifier,
                    password: req.password,
                };

                let response = match self.usecase.authenticate_user(dto).await {
                    Ok(user) => pb::AuthenticateUserResponse {
                        user: Some(mapper::user_to_proto(&user)),
                        success: true,
                        message: "Authentication successful".to_string(),
                    },
                    Err(AppError::Domain(DomainError::InvalidCredentials)) => {
                        rejected("Invalid credentials")
                    }
                    Err(AppError::Domain(DomainError::AccountNotActive)) => {
                        rejected("Account is not active")
                    }
                    Err(err) => return Err(err.into()),
                };
                Ok(Response::new(response))
            })
            .await
    }
}

fn rejected(message: &str) -> pb::AuthenticateUserResponse {
    pb::AuthenticateUserResponse {
        user: None,
        success: false,
        message: message.to_string(),
    }
}
