//! Account search filters.
//!
//! Criteria are folded into a list of [`Clause`]s and rendered as a single
//! `WHERE ... AND ...` with bound parameters. Text criteria are prefix
//! matches; LIKE wildcards in the input are escaped so they match literally.

use sqlx::{Any, QueryBuilder};

const LIKE_ESCAPE: &str = " ESCAPE '!'";

/// Search criteria for listing accounts. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserCriteria {
    pub id: Option<String>,
    pub role: Option<i64>,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// How the role criterion restricts results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleCriterion {
    /// Absent or `0`: only accounts with no role.
    Unassigned,
    /// `-1`: no role restriction.
    Any,
    /// Any other value: exact match.
    Exactly(i64),
}

impl RoleCriterion {
    pub const ANY_ROLE: i64 = -1;
    pub const NO_ROLE: i64 = 0;

    pub fn from_param(role: Option<i64>) -> Self {
        match role {
            None | Some(Self::NO_ROLE) => Self::Unassigned,
            Some(Self::ANY_ROLE) => Self::Any,
            Some(role) => Self::Exactly(role),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    IdPrefix(String),
    RoleUnset,
    RoleEquals(i64),
    RoleIn(Vec<i64>),
    /// Prefix of either first or last name.
    NamePrefix(String),
    EmailPrefix(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    clauses: Vec<Clause>,
}

impl UserFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    /// Blank text criteria are ignored.
    pub fn from_criteria(criteria: &UserCriteria) -> Self {
        let mut filter = Self::new();

        if let Some(id) = non_blank(&criteria.id) {
            filter = filter.with(Clause::IdPrefix(id.to_string()));
        }
        match RoleCriterion::from_param(criteria.role) {
            RoleCriterion::Unassigned => filter = filter.with(Clause::RoleUnset),
            RoleCriterion::Exactly(role) => filter = filter.with(Clause::RoleEquals(role)),
            RoleCriterion::Any => {}
        }
        if let Some(name) = non_blank(&criteria.name) {
            filter = filter.with(Clause::NamePrefix(name.to_string()));
        }
        if let Some(email) = non_blank(&criteria.email) {
            filter = filter.with(Clause::EmailPrefix(email.to_string()));
        }

        filter
    }

    pub fn roles(roles: &[i64]) -> Self {
        Self::new().with(Clause::RoleIn(roles.to_vec()))
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Append the WHERE clause (if any) to `qb`.
    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Any>) {
        for (i, clause) in self.clauses.iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            match clause {
                Clause::IdPrefix(prefix) => push_like(qb, "id", like_prefix(prefix)),
                Clause::RoleUnset => {
                    qb.push("role IS NULL");
                }
                Clause::RoleEquals(role) => {
                    qb.push("role = ");
                    qb.push_bind(*role);
                }
                Clause::RoleIn(roles) if roles.is_empty() => {
                    qb.push("1 = 0");
                }
                Clause::RoleIn(roles) => {
                    qb.push("role IN (");
                    let mut separated = qb.separated(", ");
                    for role in roles {
                        separated.push_bind(*role);
                    }
                    separated.push_unseparated(")");
                }
                Clause::NamePrefix(prefix) => {
                    let pattern = like_prefix(prefix);
                    qb.push("(");
                    push_like(qb, "first_name", pattern.clone());
                    qb.push(" OR ");
                    push_like(qb, "last_name", pattern);
                    qb.push(")");
                }
                Clause::EmailPrefix(prefix) => push_like(qb, "email", like_prefix(prefix)),
            }
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn push_like(qb: &mut QueryBuilder<'_, Any>, column: &str, pattern: String) {
    qb.push(column);
    qb.push(" LIKE ");
    qb.push_bind(pattern);
    qb.push(LIKE_ESCAPE);
}

/// `prefix%` with `!`, `%` and `_` escaped.
pub(crate) fn like_prefix(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '!' | '%' | '_') {
            pattern.push('!');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(filter: &UserFilter) -> String {
        let mut qb = QueryBuilder::<Any>::new("SELECT * FROM users");
        filter.push_where(&mut qb);
        qb.sql().to_string()
    }

    #[test]
    fn test_role_param_semantics() {
        assert_eq!(RoleCriterion::from_param(None), RoleCriterion::Unassigned);
        assert_eq!(RoleCriterion::from_param(Some(0)), RoleCriterion::Unassigned);
        assert_eq!(RoleCriterion::from_param(Some(-1)), RoleCriterion::Any);
        assert_eq!(RoleCriterion::from_param(Some(3)), RoleCriterion::Exactly(3));
        assert_eq!(RoleCriterion::from_param(Some(-7)), RoleCriterion::Exactly(-7));
    }

    #[test]
    fn test_empty_criteria_selects_unassigned() {
        let filter = UserFilter::from_criteria(&UserCriteria::default());
        assert_eq!(filter.clauses(), &[Clause::RoleUnset]);
        assert_eq!(render(&filter), "SELECT * FROM users WHERE role IS NULL");
    }

    #[test]
    fn test_any_role_without_text_has_no_where() {
        let criteria = UserCriteria { role: Some(-1), ..Default::default() };
        let filter = UserFilter::from_criteria(&criteria);
        assert!(filter.clauses().is_empty());
        assert_eq!(render(&filter), "SELECT * FROM users");
    }

    #[test]
    fn test_all_criteria_are_conjoined() {
        let criteria = UserCriteria {
            id: Some("ab".to_string()),
            role: Some(3),
            name: Some("Jo".to_string()),
            email: Some("jo@".to_string()),
        };
        let filter = UserFilter::from_criteria(&criteria);
        assert_eq!(
            filter.clauses(),
            &[
                Clause::IdPrefix("ab".to_string()),
                Clause::RoleEquals(3),
                Clause::NamePrefix("Jo".to_string()),
                Clause::EmailPrefix("jo@".to_string()),
            ]
        );
        assert_eq!(
            render(&filter),
            "SELECT * FROM users WHERE id LIKE ? ESCAPE '!' AND role = ? \
             AND (first_name LIKE ? ESCAPE '!' OR last_name LIKE ? ESCAPE '!') \
             AND email LIKE ? ESCAPE '!'"
        );
    }

    #[test]
    fn test_blank_text_criteria_are_ignored() {
        let criteria = UserCriteria {
            id: Some("  ".to_string()),
            role: Some(-1),
            name: Some(String::new()),
            email: None,
        };
        assert!(UserFilter::from_criteria(&criteria).clauses().is_empty());
    }

    #[test]
    fn test_role_in_renders_placeholders() {
        assert_eq!(
            render(&UserFilter::roles(&[1, 2, 3])),
            "SELECT * FROM users WHERE role IN (?, ?, ?)"
        );
        assert_eq!(render(&UserFilter::roles(&[])), "SELECT * FROM users WHERE 1 = 0");
    }

    #[test]
    fn test_like_prefix_escapes_wildcards() {
        assert_eq!(like_prefix("jo"), "jo%");
        assert_eq!(like_prefix("50%_off!"), "50!%!_off!!%");
    }
}
