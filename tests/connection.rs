#[cfg(test)]
mod tests {
    use cistern::{Connection, Error, OpenMode, Value, sql};
    use std::path::Path;

    #[test]
    fn create_database() {
        let dir = tempfile::tempdir().expect("could not create a temporary directory");
        let path = dir.path().join("creation.sqlite");
        let path = path.to_str().unwrap();
        assert!(
            !Path::new(path).exists(),
            "database file should not exist before the test"
        );
        Connection::open(path, OpenMode::ReadWrite { create: true })
            .expect("could not open the database");
        assert!(
            Path::new(path).exists(),
            "database file should be created by the connection"
        );
        Connection::open(path, OpenMode::ReadOnly).expect("could not reopen the database");
        std::fs::remove_file(path).expect("failed to remove the test database file");
        assert!(
            Connection::open(path, OpenMode::ReadOnly).is_err(),
            "should not be able to open a missing database read-only"
        );
        assert!(
            Connection::open(path, OpenMode::ReadWrite { create: false }).is_err(),
            "should not be able to open a missing database without create"
        );
    }

    #[test]
    fn read_only_rejects_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ro.sqlite");
        let path = path.to_str().unwrap();
        let mut conn = Connection::open(path, OpenMode::default()).unwrap();
        conn.execute("create table t(x)").unwrap();
        conn.close().unwrap();
        let mut conn = Connection::open(path, OpenMode::ReadOnly).unwrap();
        assert!(conn.run("insert into t values (1)").is_err());
        assert_eq!(conn.fetch_all("select * from t").unwrap().len(), 0);
    }

    #[test]
    fn select_one_from_memory() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute("create table t(x)").unwrap();
        let rows = conn.fetch_all("select 1").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 1);
        assert_eq!(rows[0].value(0), Some(&Value::Integer(1)));
    }

    #[test]
    fn execute_runs_batches() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute(
            "create table t(x integer); insert into t values (1); insert into t values (2);",
        )
        .unwrap();
        let total: i64 = conn.fetch_one_as("select sum(x) from t").unwrap();
        assert_eq!(total, 3);
    }

    #[test]
    fn run_reports_change_counters() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute("create table t(x integer)").unwrap();
        let stats = conn.run("insert into t values (10)").unwrap();
        assert_eq!(stats.rows_affected, 1);
        assert_eq!(stats.last_insert_rowid, 1);
        conn.run("insert into t values (20)").unwrap();
        let stats = conn.run("update t set x = x + 1").unwrap();
        assert_eq!(stats.rows_affected, 2);
        assert!(stats.total_rows_affected >= 2);
    }

    #[test]
    fn bound_queries_round_trip() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute("create table parts (name text, weight real, data blob)")
            .unwrap();
        let name = "wheel";
        let weight = 2.5f64;
        let data = vec![0u8, 1, 2];
        conn.run(sql!(
            "insert into parts values (" {name} ", " {weight} ", " {data.clone()} ")"
        ))
        .unwrap();
        let (fetched_name, fetched_weight, fetched_data): (String, f64, Vec<u8>) = conn
            .fetch_one_as(sql!("select name, weight, data from parts where name = " {name}))
            .unwrap();
        assert_eq!(fetched_name, "wheel");
        assert_eq!(fetched_weight, 2.5);
        assert_eq!(fetched_data, data);
    }

    #[test]
    fn null_bindings_store_nulls() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute("create table t(x)").unwrap();
        let missing: Option<i64> = None;
        conn.run(sql!("insert into t values (" {missing} ")")).unwrap();
        let fetched: Option<i64> = conn.fetch_one_as("select x from t").unwrap();
        assert_eq!(fetched, None);
    }

    #[test]
    fn empty_queries_are_rejected() {
        let mut conn = Connection::open_in_memory().unwrap();
        assert!(matches!(conn.prepare(""), Err(Error::EmptyQuery)));
        assert!(matches!(
            conn.prepare("-- nothing to see here"),
            Err(Error::EmptyQuery)
        ));
    }

    #[test]
    fn prepare_takes_a_single_statement() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute("create table t(x)").unwrap();
        assert!(matches!(
            conn.prepare("select 1; select 2"),
            Err(Error::PrepareStatement { .. })
        ));
        // a trailing semicolon is not a second statement
        assert!(conn.prepare("select 1;").is_ok());
    }

    #[test]
    fn binding_arity_is_checked() {
        let mut conn = Connection::open_in_memory().unwrap();
        let query = cistern::Sql::from_parts("select ?", vec![]);
        assert!(matches!(
            conn.prepare(query),
            Err(Error::BindingMismatch {
                expected: 1,
                got: 0
            })
        ));
        let query = cistern::Sql::from_parts("select 1", vec![Value::Integer(1)]);
        assert!(matches!(
            conn.prepare(query),
            Err(Error::BindingMismatch {
                expected: 0,
                got: 1
            })
        ));
    }

    #[test]
    fn syntax_errors_surface_from_prepare() {
        let mut conn = Connection::open_in_memory().unwrap();
        assert!(matches!(
            conn.prepare("selekt 1"),
            Err(Error::PrepareStatement { .. })
        ));
    }

    #[test]
    fn close_surfaces_cleanly() {
        let conn = Connection::open_in_memory().unwrap();
        conn.close().unwrap();
    }
}
