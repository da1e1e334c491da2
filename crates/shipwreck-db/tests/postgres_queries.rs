use serde_json::json;
use shipwreck_db::{Database, DbError, SqlDialect};
use sqlx::PgPool;

const BILLING_FIXTURE: &str = include_str!("fixtures/student_billing_pg.sql");

async fn seeded(pool: PgPool) -> Database {
    sqlx::raw_sql(BILLING_FIXTURE).execute(&pool).await.unwrap();
    Database::from_pg_pool(pool)
}

#[sqlx::test]
async fn test_rows_keep_column_order_and_numeric_values(pool: PgPool) {
    let db = seeded(pool).await;
    assert_eq!(db.dialect(), SqlDialect::Postgres);

    let rows = db
        .fetch_rows(
            "SELECT t.code AS term_code, SUM(c.quantity * c.unit_amount) AS total_revenue \
             FROM Charge c \
             JOIN StudentAccountTerm sat ON sat.student_account_term_id = c.student_account_term_id \
             JOIN Term t ON t.term_id = sat.term_id \
             JOIN Student s ON s.student_id = sat.student_id \
             WHERE c.charge_type = 'Tuition' AND s.active \
               AND s.standing IN ('Freshman','Sophomore','Junior','Senior') \
             GROUP BY t.code ORDER BY t.code;",
        )
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    let keys: Vec<&str> = rows[0].keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["term_code", "total_revenue"]);
    assert_eq!(rows[0]["term_code"], json!("2019FA"));
    assert_eq!(rows[0]["total_revenue"], json!(14250.0));
    assert_eq!(rows[1]["term_code"], json!("2020SP"));
    assert_eq!(rows[1]["total_revenue"], json!(12480.0));
}

#[sqlx::test]
async fn test_dates_and_nulls_become_json(pool: PgPool) {
    let db = seeded(pool).await;

    let rows = db
        .fetch_rows("SELECT term_id, start_date, NULL AS missing FROM Term WHERE term_id = 1")
        .await
        .unwrap();

    assert_eq!(rows[0]["term_id"], json!(1));
    assert_eq!(rows[0]["start_date"], json!("2019-08-26"));
    assert_eq!(rows[0]["missing"], json!(null));
}

#[sqlx::test]
async fn test_trailing_comment_and_limit(pool: PgPool) {
    let db = seeded(pool).await;

    let rows = db
        .fetch_rows_limited("SELECT code FROM Term ORDER BY term_id -- oldest first", Some(2))
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["code"], json!("2019FA"));
    assert_eq!(rows[1]["code"], json!("2020SP"));
}

#[sqlx::test]
async fn test_writes_are_refused_by_the_transaction(pool: PgPool) {
    let db = seeded(pool.clone()).await;

    // Passes the statement guard but needs a writable transaction.
    let err = db
        .fetch_rows("SELECT nextval('charge_id_seq') AS next_id")
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Sqlx(_)));
    assert!(err.to_string().contains("read-only transaction"));

    let (last_value, is_called): (i64, bool) =
        sqlx::query_as("SELECT last_value, is_called FROM charge_id_seq")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!((last_value, is_called), (100, false));
}

#[sqlx::test]
async fn test_list_and_describe_tables(pool: PgPool) {
    let db = seeded(pool).await;

    let tables = db.list_tables().await.unwrap();
    assert_eq!(
        tables,
        vec!["charge", "student", "studentaccountterm", "term"]
    );

    let described = db.describe_tables(&["Term".to_string()]).await.unwrap();
    assert_eq!(described[0].name, "term");
    let columns: Vec<(&str, &str, bool)> = described[0]
        .columns
        .iter()
        .map(|c| (c.name.as_str(), c.data_type.as_str(), c.nullable))
        .collect();
    assert_eq!(
        columns,
        vec![
            ("term_id", "integer", false),
            ("code", "text", false),
            ("start_date", "date", false),
            ("end_date", "date", false),
        ]
    );
}
