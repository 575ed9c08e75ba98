use crate::models::account::Role;
use crate::models::session::Principal;

/// Access requirement of a route class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// No session needed
    Public,
    /// Any authenticated role
    Authenticated,
    /// Employee or admin
    Staff,
    /// Admin only
    Admin,
}

/// Stateless access decision. A missing session on a protected route is
/// denied exactly like a role mismatch.
pub fn allow(access: RouteAccess, principal: Option<&Principal>) -> bool {
    match access {
        RouteAccess::Public => true,
        RouteAccess::Authenticated => principal.is_some(),
        RouteAccess::Staff => matches!(
            principal.map(|p| p.role),
            Some(Role::Employee) | Some(Role::Admin)
        ),
        RouteAccess::Admin => matches!(principal.map(|p| p.role), Some(Role::Admin)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Role) -> Principal {
        Principal {
            account_id: "id".to_string(),
            name: "Test User".to_string(),
            email: "t@x.com".to_string(),
            role,
            is_email_verified: true,
        }
    }

    #[test]
    fn public_routes_never_require_a_session() {
        assert!(allow(RouteAccess::Public, None));
        assert!(allow(RouteAccess::Public, Some(&principal(Role::Customer))));
    }

    #[test]
    fn missing_session_is_denied_on_protected_routes() {
        assert!(!allow(RouteAccess::Authenticated, None));
        assert!(!allow(RouteAccess::Staff, None));
        assert!(!allow(RouteAccess::Admin, None));
    }

    #[test]
    fn decision_table_over_all_roles() {
        let roles = [Role::Customer, Role::Employee, Role::Admin];
        for role in roles {
            let p = principal(role);
            assert!(allow(RouteAccess::Authenticated, Some(&p)));
            assert_eq!(
                allow(RouteAccess::Staff, Some(&p)),
                matches!(role, Role::Employee | Role::Admin)
            );
            assert_eq!(allow(RouteAccess::Admin, Some(&p)), role == Role::Admin);
        }
    }
}
