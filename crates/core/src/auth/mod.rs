//! Authorization: who may administer a ticket.

mod policy;

pub use policy::StaffPolicy;

use crate::config::TicketsConfig;

/// Build the staff policy from configuration.
pub fn create_policy(config: &TicketsConfig) -> StaffPolicy {
    StaffPolicy::new(config.support_roles.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_policy_from_config() {
        let config = TicketsConfig {
            support_roles: vec!["Helpers".to_string()],
            ..Default::default()
        };
        let policy = create_policy(&config);
        assert_eq!(policy.support_roles(), &["Helpers".to_string()]);
        assert_eq!(policy.staff_roles().len(), 4);
    }
}
