use diesel::prelude::*;
use purchase_tracker::schema::user_roles;

mod common;

#[test]
fn test_migrations_seed_roles_and_files_are_removed() {
    let base = "test_migrations_seed_roles.db";

    {
        let test_db = common::TestDb::new(base);
        let mut conn = test_db.pool().get().unwrap();
        let mut roles = user_roles::table
            .select(user_roles::name)
            .load::<String>(&mut conn)
            .unwrap();
        roles.sort();
        assert_eq!(roles, vec!["admin".to_string(), "user".to_string()]);
    }

    assert!(!std::path::Path::new(base).exists());
    assert!(!std::path::Path::new(&format!("{base}-shm")).exists());
    assert!(!std::path::Path::new(&format!("{base}-wal")).exists());
}
