use crate::config::StoreConfig;

/// Logical tables of the service; physical names carry the environment prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Users,
    Groups,
    GroupMemberships,
    Expenses,
    Splits,
    FriendRequests,
    Notifications,
}

impl Table {
    /// All tables, parents before children
    pub const ALL: [Table; 7] = [
        Table::Users,
        Table::Groups,
        Table::GroupMemberships,
        Table::Expenses,
        Table::Splits,
        Table::FriendRequests,
        Table::Notifications,
    ];

    pub fn base_name(&self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::Groups => "groups",
            Table::GroupMemberships => "group_memberships",
            Table::Expenses => "expenses",
            Table::Splits => "splits",
            Table::FriendRequests => "friend_requests",
            Table::Notifications => "notifications",
        }
    }

    /// Unique keys, mirrored by the in-memory store
    pub fn unique_keys(&self) -> &'static [&'static [&'static str]] {
        match self {
            Table::Users => &[&["id"], &["email"], &["firebase_id"]],
            Table::GroupMemberships => &[&["group_id", "user_id"]],
            Table::FriendRequests => &[&["id"], &["from_user", "to_user"]],
            Table::Groups | Table::Expenses | Table::Splits | Table::Notifications => &[&["id"]],
        }
    }
}

/// Resolves logical tables to environment-prefixed physical names
#[derive(Debug, Clone)]
pub struct TableNames {
    config: StoreConfig,
}

impl TableNames {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn get(&self, table: Table) -> String {
        self.config.table_name(table.base_name())
    }

    pub fn prefix(&self) -> &str {
        &self.config.table_prefix
    }

    pub fn environment(&self) -> &str {
        &self.config.environment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed_names() {
        let names = TableNames::new(StoreConfig::for_environment("staging"));
        assert_eq!(names.get(Table::Splits), "staging_splits");
        assert_eq!(names.get(Table::GroupMemberships), "staging_group_memberships");

        let names = TableNames::new(StoreConfig::for_environment("production"));
        assert_eq!(names.get(Table::Users), "users");
    }

    #[test]
    fn test_every_table_has_a_key() {
        for table in Table::ALL {
            assert!(!table.unique_keys().is_empty(), "{:?}", table);
        }
    }
}
