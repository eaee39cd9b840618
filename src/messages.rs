use std::fmt;

/// Keys of every human-readable message the service can emit.
///
/// Keys are resolved to text only at the response boundary; nothing branches
/// on the translated string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    TokenNotProvided,
    TokenNotValid,
    InvalidCredentials,
    PasswordNotMatch,
    LoginFailed,
    RoleForbidden,
    InvalidPayload,
    UserNotFound,
    UserExists,
    UserMissingData,
    UserInvalidId,
    UserInternal,
    UserCreated,
    UserUpdated,
    UserDeleted,
    PromotedToAdmin,
    PromotedToAdminFailed,
    ReviewNotFound,
    ReviewNotOwned,
    ReviewInternal,
    ReviewCreated,
    ReviewUpdated,
    ReviewDeleted,
}

impl MessageKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKey::TokenNotProvided => "services.AUTH.ERRORS.TOKEN_NOT_PROVIDED",
            MessageKey::TokenNotValid => "services.AUTH.ERRORS.TOKEN_NOT_VALID",
            MessageKey::InvalidCredentials => "services.AUTH.ERRORS.INVALID_CREDENTIALS",
            MessageKey::PasswordNotMatch => "services.AUTH.ERRORS.PASSWORD_NOT_MATCH",
            MessageKey::LoginFailed => "services.AUTH.ERRORS.LOGIN_FAILED",
            MessageKey::RoleForbidden => "services.ROLE.ERRORS.FORBIDDEN",
            MessageKey::InvalidPayload => "common.ERRORS.INVALID_PAYLOAD",
            MessageKey::UserNotFound => "services.USER.ERRORS.NOT_FOUND",
            MessageKey::UserExists => "services.USER.ERRORS.EXISTS",
            MessageKey::UserMissingData => "services.USER.ERRORS.MISSING_DATA",
            MessageKey::UserInvalidId => "services.USER.ERRORS.INVALID_ID",
            MessageKey::UserInternal => "services.USER.ERRORS.INTERNAL_SERVER_ERROR",
            MessageKey::UserCreated => "services.USER.SUCCESS.CREATED",
            MessageKey::UserUpdated => "services.USER.SUCCESS.UPDATED",
            MessageKey::UserDeleted => "services.USER.SUCCESS.DELETED",
            MessageKey::PromotedToAdmin => "services.USER.MESSAGES.PROMOTED_TO_ADMIN",
            MessageKey::PromotedToAdminFailed => "services.USER.MESSAGES.PROMOTED_TO_ADMIN_FAILED",
            MessageKey::ReviewNotFound => "services.REVIEW.ERRORS.NOT_FOUND",
            MessageKey::ReviewNotOwned => "services.REVIEW.ERRORS.NOT_OWNED",
            MessageKey::ReviewInternal => "services.REVIEW.ERRORS.INTERNAL_SERVER_ERROR",
            MessageKey::ReviewCreated => "services.REVIEW.SUCCESS.CREATED",
            MessageKey::ReviewUpdated => "services.REVIEW.SUCCESS.UPDATED",
            MessageKey::ReviewDeleted => "services.REVIEW.SUCCESS.DELETED",
        }
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve a message key against the built-in English catalog.
pub fn translate(key: MessageKey) -> &'static str {
    match key {
        MessageKey::TokenNotProvided => "Access token not provided",
        MessageKey::TokenNotValid => "Access token is not valid",
        MessageKey::InvalidCredentials => "Invalid email or password",
        MessageKey::PasswordNotMatch => "Password does not match",
        MessageKey::LoginFailed => "Login failed, please try again later",
        MessageKey::RoleForbidden => "You are not authorized to perform this action",
        MessageKey::InvalidPayload => "Request body is malformed or incomplete",
        MessageKey::UserNotFound => "User not found",
        MessageKey::UserExists => "A user with this email already exists",
        MessageKey::UserMissingData => "Password confirmation is required",
        MessageKey::UserInvalidId => "Invalid id",
        MessageKey::UserInternal => "Unexpected error while handling the user",
        MessageKey::UserCreated => "User created",
        MessageKey::UserUpdated => "User updated",
        MessageKey::UserDeleted => "User deleted",
        MessageKey::PromotedToAdmin => "User promoted to admin",
        MessageKey::PromotedToAdminFailed => "Failed to promote user to admin",
        MessageKey::ReviewNotFound => "Review not found",
        MessageKey::ReviewNotOwned => "You do not own this review",
        MessageKey::ReviewInternal => "Unexpected error while handling the review",
        MessageKey::ReviewCreated => "Review created",
        MessageKey::ReviewUpdated => "Review updated",
        MessageKey::ReviewDeleted => "Review deleted",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_use_dotted_namespaces() {
        assert_eq!(
            MessageKey::ReviewNotOwned.as_str(),
            "services.REVIEW.ERRORS.NOT_OWNED"
        );
        assert_eq!(MessageKey::TokenNotValid.to_string(), "services.AUTH.ERRORS.TOKEN_NOT_VALID");
    }

    #[test]
    fn translation_is_plain_text() {
        assert_eq!(translate(MessageKey::UserNotFound), "User not found");
        assert!(!translate(MessageKey::UserInternal).contains("services."));
    }
}
