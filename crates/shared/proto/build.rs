/// Request messages that pass through the server's validation stage.
const USER_REQUESTS: &[&str] = &[
    "CreateUserRequest",
    "GetUserRequest",
    "ListUsersRequest",
    "UpdateUserRequest",
    "DeleteUserRequest",
    "BatchGetUsersRequest",
    "SearchUsersRequest",
    "ChangePasswordRequest",
    "AuthenticateUserRequest",
];

/// Fields that must be non-empty, with the message reported when they are not.
const REQUIRED_FIELDS: &[(&str, &str)] = &[
    ("CreateUserRequest.email", "email is required"),
    ("CreateUserRequest.username", "username is required"),
    ("CreateUserRequest.password", "password is required"),
    ("GetUserRequest.id", "id is required"),
    ("UpdateUserRequest.id", "id is required"),
    ("DeleteUserRequest.id", "id is required"),
    ("ChangePasswordRequest.user_id", "user_id is required"),
    ("ChangePasswordRequest.old_password", "old_password is required"),
    ("ChangePasswordRequest.new_password", "new_password is required"),
    ("AuthenticateUserRequest.identifier", "identifier is required"),
    ("AuthenticateUserRequest.password", "password is required"),
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Compile user service proto
    let mut user = tonic_build::configure()
        .build_server(true)
        .build_client(true);
    for message in USER_REQUESTS {
        user = user.type_attribute(
            format!(".user.v1.{message}"),
            "#[derive(validator::Validate)]",
        );
    }
    for (field, message) in REQUIRED_FIELDS {
        user = user.field_attribute(
            format!(".user.v1.{field}"),
            format!("#[validate(length(min = 1, message = \"{message}\"))]"),
        );
    }
    user.field_attribute(
        ".user.v1.BatchGetUsersRequest.ids",
        "#[validate(length(min = 1, max = 100, message = \"between 1 and 100 ids are required\"))]",
    )
    .compile_protos(&["proto/user.proto"], &["proto/"])?;

    // Compile health service proto
    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .type_attribute(
            ".health.v1.HealthCheckRequest",
            "#[derive(validator::Validate)]",
        )
        .compile_protos(&["proto/health.proto"], &["proto/"])?;

    Ok(())
}
