#[cfg(test)]
mod tests {
    use crate::errors::AdminError;
    use crate::errors::internal::{AuditError, AuthorizationError, CredentialError, InternalError};
    use sea_orm::DbErr;

    #[test]
    fn test_database_error_converts_to_internal_server_error() {
        let db_err = DbErr::RecordNotFound("test".to_string());
        let internal_err = InternalError::database("list_users", db_err);
        let admin_err = AdminError::from_internal_error(internal_err);

        assert_eq!(admin_err.message(), "An internal error occurred");
        assert_eq!(admin_err.status_code(), 500);
    }

    #[test]
    fn test_crypto_error_does_not_leak_details() {
        let internal_err = InternalError::crypto("password_hash", "argon2 params rejected");
        let admin_err = AdminError::from_internal_error(internal_err);

        assert!(!admin_err.message().contains("argon2"));
        assert_eq!(admin_err.status_code(), 500);
    }

    #[test]
    fn test_user_not_found_converts_to_404() {
        let internal_err = InternalError::Credential(CredentialError::UserIdNotFound { user_id: 42 });
        let admin_err = AdminError::from_internal_error(internal_err);

        assert_eq!(admin_err.status_code(), 404);
        assert!(admin_err.message().contains("42"));
    }

    #[test]
    fn test_duplicate_username_converts_to_409() {
        let internal_err =
            InternalError::Credential(CredentialError::DuplicateUsername("anna".to_string()));
        let admin_err = AdminError::from_internal_error(internal_err);

        assert_eq!(admin_err.status_code(), 409);
        assert_eq!(admin_err.message(), "Username already exists");
    }

    #[test]
    fn test_password_validation_keeps_reason() {
        let internal_err = InternalError::Credential(CredentialError::PasswordValidationFailed(
            "Password must contain at least one digit".to_string(),
        ));
        let admin_err = AdminError::from_internal_error(internal_err);

        assert_eq!(admin_err.status_code(), 400);
        assert_eq!(admin_err.message(), "Password must contain at least one digit");
    }

    #[test]
    fn test_authorization_errors_map_to_distinct_statuses() {
        assert_eq!(AdminError::from(AuthorizationError::Unauthorized).status_code(), 401);
        assert_eq!(AdminError::from(AuthorizationError::PasswordChangeRequired).status_code(), 403);

        let forbidden = AdminError::from(AuthorizationError::Forbidden {
            permission: "users.edit".to_string(),
        });
        assert_eq!(forbidden.status_code(), 403);
        assert!(forbidden.message().contains("users.edit"));

        match AdminError::from(AuthorizationError::Escalation { permission: "audit.view".to_string() }) {
            AdminError::PermissionEscalation(_) => {}
            other => panic!("Expected PermissionEscalation, got {:?}", other),
        }

        match AdminError::from(AuthorizationError::UnknownPermission("news.publish".to_string())) {
            AdminError::InvalidGrant(json) => assert_eq!(json.0.status_code, 400),
            other => panic!("Expected InvalidGrant, got {:?}", other),
        }
    }

    #[test]
    fn test_audit_error_converts_to_internal_server_error() {
        let internal_err = InternalError::Audit(AuditError::WriteFailed("disk full".to_string()));
        let admin_err = AdminError::from_internal_error(internal_err);

        assert_eq!(admin_err.message(), "An internal error occurred");
    }
}
