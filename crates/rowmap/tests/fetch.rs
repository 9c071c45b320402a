//! Fetch and write paths against a scripted executor.

use rowmap::mock::{Expectation, MockExecutor};
use rowmap::prelude::*;
use std::sync::Arc;

#[derive(Debug, Default, Clone, PartialEq, Model)]
struct Account {
    #[rowmap(primary)]
    id: i64,
    name: String,
    #[rowmap(column = "balance_cents")]
    balance: i64,
}

fn setup() -> (Arc<MockExecutor>, Db<Arc<MockExecutor>>) {
    let mock = Arc::new(MockExecutor::new());
    let db = Db::new(mock.clone());
    db.register::<Account>().unwrap();
    (mock, db)
}

fn rows(n: i64) -> Rows {
    Rows::new(
        ["id", "name"],
        (1..=n)
            .map(|i| vec![Value::Int(i), Value::Text(format!("acct-{i}"))])
            .collect(),
    )
}

#[tokio::test]
async fn get_binds_returned_columns() {
    let (mock, db) = setup();
    mock.expect(
        Expectation::query("select * from account where id = ? limit 1")
            .with_args(vec![Value::Int(5)])
            .returning(Rows::new(
                ["id", "name"],
                vec![vec![Value::Int(5), Value::Text("foo".into())]],
            )),
    );

    let mut account = Account {
        balance: 99,
        ..Default::default()
    };
    db.select(&["*"])
        .and_where("id = ?", args![5])
        .get(&mut account)
        .await
        .unwrap();

    assert_eq!(account.id, 5);
    assert_eq!(account.name, "foo");
    // not returned, left as it was
    assert_eq!(account.balance, 99);
    mock.verify().unwrap();
}

#[tokio::test]
async fn get_without_rows_is_not_found() {
    let (mock, db) = setup();
    mock.expect(Expectation::query("select * from account where id = ? limit 1"));

    let mut account = Account::default();
    let err = db
        .select(&["*"])
        .and_where("id = ?", args![404])
        .get(&mut account)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn get_all_stops_at_limit() {
    let (mock, db) = setup();
    mock.expect(Expectation::query("select * from account order by id limit 2").returning(rows(5)));

    let mut accounts: Vec<Box<Account>> = Vec::new();
    db.select(&["*"])
        .order_by("id")
        .limit(2)
        .get_all_boxed(&mut accounts)
        .await
        .unwrap();

    assert_eq!(accounts.len(), 2);
    assert_eq!(accounts[1].name, "acct-2");
}

#[tokio::test]
async fn get_all_replaces_destination() {
    let (mock, db) = setup();
    mock.expect(Expectation::query("select * from account limit 10").returning(rows(3)));

    let mut accounts = vec![Account::default(); 7];
    db.select(&["*"]).limit(10).get_all(&mut accounts).await.unwrap();
    assert_eq!(accounts.len(), 3);
    assert_eq!(accounts[0].id, 1);
}

#[tokio::test]
async fn get_all_without_limit_never_reaches_executor() {
    let (mock, db) = setup();
    let mut accounts: Vec<Account> = Vec::new();
    let err = db.select(&["*"]).get_all(&mut accounts).await.unwrap_err();
    assert!(matches!(err, OrmError::LimitRequired));
    assert!(mock.statements().is_empty());
}

#[tokio::test]
async fn qualified_and_renamed_columns_bind() {
    let (mock, db) = setup();
    mock.expect(
        Expectation::query("select account.id, account.name, account.balance_cents from account join owner on owner.account_id = account.id limit 1")
            .returning(Rows::new(
                ["account.id", "account.name", "account.balance_cents"],
                vec![vec![Value::Int(1), Value::Text("main".into()), Value::Int(1250)]],
            )),
    );

    let mut account = Account::default();
    db.select(&["*"])
        .join("owner on owner.account_id = account.id")
        .get(&mut account)
        .await
        .unwrap();
    assert_eq!(account.balance, 1250);
}

#[tokio::test]
async fn unknown_column_is_reported() {
    let (mock, db) = setup();
    mock.expect(
        Expectation::query("select id, nickname from account limit 1").returning(Rows::new(
            ["id", "nickname"],
            vec![vec![Value::Int(1), Value::Text("x".into())]],
        )),
    );

    let mut account = Account::default();
    let err = db
        .select(&["id", "nickname"])
        .get(&mut account)
        .await
        .unwrap_err();
    assert!(matches!(err, OrmError::UnknownColumn { ref column, .. } if column == "nickname"));
}

#[tokio::test]
async fn decode_errors_name_the_column() {
    let (mock, db) = setup();
    mock.expect(
        Expectation::query("select * from account limit 1").returning(Rows::new(
            ["id", "balance_cents"],
            vec![vec![Value::Int(1), Value::Text("lots".into())]],
        )),
    );

    let mut account = Account::default();
    let err = db.select(&["*"]).get(&mut account).await.unwrap_err();
    assert!(err.is_parse() || matches!(err, OrmError::Decode { .. }));
    assert!(err.to_string().contains("lots"));
}

#[tokio::test]
async fn driver_errors_pass_through() {
    let (mock, db) = setup();
    mock.expect(Expectation::exec("delete from account where id = ?").failing("connection reset"));

    let account = Account {
        id: 3,
        ..Default::default()
    };
    let err = db.delete(&account).unwrap().exec().await.unwrap_err();
    assert!(err.is_driver());
    assert!(err.to_string().contains("connection reset"));
}

#[tokio::test]
async fn update_and_count_round_trip() {
    let (mock, db) = setup();
    mock.expect(
        Expectation::exec("update account set name = ?, balance_cents = ? where id = ?")
            .with_args(args!["savings", 10, 8_i64])
            .returning_exec(1, None),
    )
    .expect(
        Expectation::query("select count(*) from account where balance_cents > ?")
            .returning(Rows::new(["count"], vec![vec![Value::Int(4)]])),
    );

    let account = Account {
        id: 8,
        name: "savings".into(),
        balance: 10,
    };
    let result = db.update(&account).unwrap().exec().await.unwrap();
    assert_eq!(result.rows_affected, 1);

    let n = db
        .count("account", "")
        .and_where("balance_cents > ?", args![0])
        .exec()
        .await
        .unwrap();
    assert_eq!(n, 4);
    mock.verify().unwrap();
}

#[tokio::test]
async fn raw_query_into_records() {
    let (mock, db) = setup();
    mock.expect(Expectation::query("select id, name from account where name like ?").returning(rows(3)));

    let mut accounts: Vec<Account> = Vec::new();
    db.query_into(
        "select id, name from account where name like ?",
        &args!["acct-%"],
        &mut accounts,
    )
    .await
    .unwrap();
    assert_eq!(accounts.len(), 3);
}

#[tokio::test]
async fn unregistered_models_are_rejected() {
    #[derive(Debug, Default, Model)]
    struct Ghost {
        #[rowmap(primary)]
        id: i64,
    }

    let (_mock, db) = setup();
    let mut ghost = Ghost::default();
    let err = db.select(&["*"]).get(&mut ghost).await.unwrap_err();
    assert!(matches!(err, OrmError::UnregisteredModel(_)));
    assert!(db.insert(&mut ghost).is_err());
}
