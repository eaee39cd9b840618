use uuid::Uuid;

use crate::errors::AppError;
use crate::messages::MessageKey;
use crate::security::guard::Caller;
use crate::security::roles::RoleSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    Allow,
    Deny,
}

/// Owners may mutate their resources; the elevated role may mutate anything.
pub fn decide(actor_id: Uuid, owner_id: Uuid, actor_roles: &RoleSet) -> Ownership {
    if actor_roles.is_elevated() || actor_id == owner_id {
        Ownership::Allow
    } else {
        Ownership::Deny
    }
}

/// Reject callers who neither own the review nor hold the elevated role.
pub fn enforce(caller: &Caller, owner_id: Uuid) -> Result<(), AppError> {
    match decide(caller.id, owner_id, &caller.roles) {
        Ownership::Allow => Ok(()),
        Ownership::Deny => Err(AppError::Forbidden(MessageKey::ReviewNotOwned)),
    }
}

/// Gate a mutation on an already loaded review.
///
/// Absence is reported as `NotFound` before ownership is looked at, so a
/// missing resource never shows up as a permission failure.
pub fn authorize_mutation<T>(
    caller: &Caller,
    resource: Option<T>,
    not_found: MessageKey,
    owner_of: impl Fn(&T) -> Uuid,
) -> Result<T, AppError> {
    let resource = resource.ok_or(AppError::NotFound(not_found))?;
    enforce(caller, owner_of(&resource))?;
    Ok(resource)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::roles::Role;

    const NOT_FOUND: MessageKey = MessageKey::ReviewNotFound;

    fn caller(roles: RoleSet) -> Caller {
        Caller {
            id: Uuid::new_v4(),
            email: "b@example.com".into(),
            username: "bee".into(),
            display_name: "Bee".into(),
            roles,
        }
    }

    #[test]
    fn owner_is_allowed() {
        let id = Uuid::new_v4();
        assert_eq!(decide(id, id, &RoleSet::new()), Ownership::Allow);
    }

    #[test]
    fn stranger_is_denied() {
        assert_eq!(decide(Uuid::new_v4(), Uuid::new_v4(), &RoleSet::new()), Ownership::Deny);
    }

    #[test]
    fn elevated_role_waives_ownership() {
        let roles = RoleSet::with(&[Role::Admin]);
        assert_eq!(decide(Uuid::new_v4(), Uuid::new_v4(), &roles), Ownership::Allow);
    }

    #[test]
    fn enforce_maps_deny_to_forbidden() {
        let stranger = caller(RoleSet::new());
        assert_eq!(
            enforce(&stranger, Uuid::new_v4()).unwrap_err(),
            AppError::Forbidden(MessageKey::ReviewNotOwned)
        );
        assert!(enforce(&stranger, stranger.id).is_ok());
    }

    #[test]
    fn missing_resource_is_not_found_even_for_strangers() {
        let err = authorize_mutation::<Uuid>(&caller(RoleSet::new()), None, NOT_FOUND, |o| *o)
            .unwrap_err();
        assert_eq!(err, AppError::NotFound(MessageKey::ReviewNotFound));
    }

    #[test]
    fn foreign_resource_is_forbidden() {
        let err = authorize_mutation(
            &caller(RoleSet::new()),
            Some(Uuid::new_v4()),
            NOT_FOUND,
            |o| *o,
        )
        .unwrap_err();
        assert_eq!(err, AppError::Forbidden(MessageKey::ReviewNotOwned));
    }

    #[test]
    fn admin_gets_the_resource_back() {
        let owner = Uuid::new_v4();
        let admin = caller(RoleSet::with(&[Role::Admin]));
        let got = authorize_mutation(&admin, Some(owner), NOT_FOUND, |o| *o).unwrap();
        assert_eq!(got, owner);
    }
}
