use crate::platform::Member;
use crate::ticket::TicketType;

/// Decides who may administer tickets.
///
/// Holds role *names* only. Role membership is always read from the
/// [`Member`] handed in, which callers fetch fresh for every check.
#[derive(Debug, Clone)]
pub struct StaffPolicy {
    staff_roles: Vec<String>,
    support_roles: Vec<String>,
}

impl StaffPolicy {
    /// Policy with the tier roles as staff and extra support roles that may
    /// rename tickets and pull transcripts.
    pub fn new(support_roles: Vec<String>) -> Self {
        Self {
            staff_roles: TicketType::ALL
                .iter()
                .map(|t| t.staff_role().to_string())
                .collect(),
            support_roles,
        }
    }

    /// The fixed staff role names.
    pub fn staff_roles(&self) -> &[String] {
        &self.staff_roles
    }

    pub fn support_roles(&self) -> &[String] {
        &self.support_roles
    }

    /// Administrator, or holder of at least one staff role.
    pub fn has_permission(&self, member: &Member) -> bool {
        member.administrator || self.holds_staff_role(member)
    }

    pub fn holds_staff_role(&self, member: &Member) -> bool {
        self.staff_roles.iter().any(|role| member.holds_role(role))
    }

    /// Rename is gated on role membership alone; administrators without a
    /// staff or support role are refused.
    pub fn may_rename(&self, member: &Member) -> bool {
        self.holds_staff_role(member) || self.holds_support_role(member)
    }

    pub fn may_generate_transcript(&self, member: &Member) -> bool {
        self.has_permission(member) || self.holds_support_role(member)
    }

    fn holds_support_role(&self, member: &Member) -> bool {
        self.support_roles.iter().any(|role| member.holds_role(role))
    }
}

impl Default for StaffPolicy {
    fn default() -> Self {
        Self::new(vec!["Support Team".to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member() -> Member {
        Member::new(10, "someone")
    }

    #[test]
    fn test_plain_member_has_no_permission() {
        let policy = StaffPolicy::default();
        assert!(!policy.has_permission(&member()));
        assert!(!policy.may_rename(&member()));
        assert!(!policy.may_generate_transcript(&member()));
    }

    #[test]
    fn test_administrator_has_permission() {
        let policy = StaffPolicy::default();
        let admin = member().with_administrator();
        assert!(policy.has_permission(&admin));
        assert!(policy.may_generate_transcript(&admin));
        assert!(!policy.may_rename(&admin));
    }

    #[test]
    fn test_each_tier_role_grants_permission() {
        let policy = StaffPolicy::default();
        for ticket_type in TicketType::ALL {
            let staff = member().with_role(ticket_type.staff_role());
            assert!(policy.has_permission(&staff), "{}", ticket_type);
            assert!(policy.may_rename(&staff));
        }
    }

    #[test]
    fn test_support_role_is_not_staff() {
        let policy = StaffPolicy::default();
        let support = member().with_role("Support Team");
        assert!(!policy.has_permission(&support));
        assert!(policy.may_rename(&support));
        assert!(policy.may_generate_transcript(&support));
    }

    #[test]
    fn test_unrelated_role_is_ignored() {
        let policy = StaffPolicy::default();
        let other = member().with_role("Trader").with_role("trial middleman");
        assert!(!policy.has_permission(&other));
    }

    #[test]
    fn test_role_removal_takes_effect_on_next_check() {
        let policy = StaffPolicy::default();
        let mut staff = member().with_role("Head Middleman");
        assert!(policy.has_permission(&staff));

        staff.roles.clear();
        assert!(!policy.has_permission(&staff));
    }
}
