//! Mandatory role families, recognised by normalised name.

use sowcraft_core::normalize_role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleKind {
    HeadOf,
    ProjectCoordination,
    AccountManagement,
    Other,
}

impl RoleKind {
    /// Classify a role name. Head-Of wins over the other families.
    pub fn of(role: &str) -> Self {
        let key = normalize_role(role);
        if key.contains("head of") {
            RoleKind::HeadOf
        } else if key.contains("project coordination") {
            RoleKind::ProjectCoordination
        } else if is_account_management(&key) {
            RoleKind::AccountManagement
        } else {
            RoleKind::Other
        }
    }

    pub fn is_mandatory(self) -> bool {
        self != RoleKind::Other
    }
}

/// "account" plus management/manager/director, except the
/// "Project Management - (Account ...)" roles, which are delivery roles.
fn is_account_management(key: &str) -> bool {
    key.contains("account")
        && (key.contains("management") || key.contains("manager") || key.contains("director"))
        && !key.starts_with("project management")
}

/// Testing/QA roles count toward the QA baseline.
pub fn is_quality_assurance(role: &str) -> bool {
    let key = normalize_role(role);
    key.contains("testing") || key.split(|c: char| !c.is_alphanumeric()).any(|w| w == "qa")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_catalog_roles() {
        assert_eq!(RoleKind::of("Tech - Head Of - Senior Project Management"), RoleKind::HeadOf);
        assert_eq!(RoleKind::of("Tech - Head Of - System Setup"), RoleKind::HeadOf);
        assert_eq!(
            RoleKind::of("Tech - Delivery - Project Coordination"),
            RoleKind::ProjectCoordination
        );
        assert_eq!(
            RoleKind::of("Account Management - (Account Manager)"),
            RoleKind::AccountManagement
        );
        assert_eq!(RoleKind::of("Account Management (Off)"), RoleKind::AccountManagement);
        assert_eq!(RoleKind::of("Senior Account Director"), RoleKind::AccountManagement);
        assert_eq!(RoleKind::of("Tech - Producer - Design"), RoleKind::Other);
    }

    #[test]
    fn project_management_account_roles_are_not_account_management() {
        assert_eq!(RoleKind::of("Project Management - (Account Manager)"), RoleKind::Other);
        assert_eq!(RoleKind::of("Tech - Delivery - Project Management"), RoleKind::Other);
    }

    #[test]
    fn qa_roles() {
        assert!(is_quality_assurance("Tech - Producer - Testing"));
        assert!(is_quality_assurance("QA Engineer"));
        assert!(!is_quality_assurance("Quality Copywriting"));
    }
}
