use super::*;
use crate::client::{ExecResult, Executor, Rows};
use crate::error::OrmResult;
use crate::mock::{Expectation, MockExecutor};
use crate::{Db, Model, OrmError, Value, args};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default, Clone, PartialEq, Model)]
struct User {
    #[rowmap(primary)]
    id: i64,
    role: String,
    email: String,
    active: bool,
}

#[derive(Debug, Default, Model)]
struct Post {
    #[rowmap(primary)]
    id: i64,
    user_id: i64,
    title: String,
}

#[derive(Debug, Default, Model)]
struct Membership {
    #[rowmap(primary)]
    org_id: i64,
    role: String,
    #[rowmap(primary)]
    user_id: i64,
}

#[derive(Debug, Default, Model)]
struct OnlyKey {
    #[rowmap(primary)]
    id: i64,
}

fn db() -> Db<()> {
    let db = Db::new(());
    db.register::<User>().unwrap();
    db.register::<Post>().unwrap();
    db.register::<Membership>().unwrap();
    db.register::<OnlyKey>().unwrap();
    db
}

fn membership(org_id: i64, user_id: i64) -> Membership {
    Membership {
        org_id,
        role: "a".into(),
        user_id,
    }
}

/// Executor that hands out a key for every insert that asks for one.
#[derive(Default)]
struct KeyedExecutor {
    requested: Mutex<Vec<String>>,
}

impl KeyedExecutor {
    fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl Executor for KeyedExecutor {
    async fn exec(&self, _sql: &str, _args: &[Value]) -> OrmResult<ExecResult> {
        Ok(ExecResult {
            rows_affected: 1,
            last_insert_id: None,
        })
    }

    async fn query(&self, _sql: &str, _args: &[Value]) -> OrmResult<Rows> {
        Ok(Rows::empty())
    }

    async fn insert_returning(
        &self,
        _sql: &str,
        _args: &[Value],
        key_column: &str,
    ) -> OrmResult<ExecResult> {
        self.requested.lock().unwrap().push(key_column.to_string());
        Ok(ExecResult {
            rows_affected: 1,
            last_insert_id: Some(77),
        })
    }
}

fn admin(id: i64) -> User {
    User {
        id,
        role: "admin".into(),
        email: "root@example.com".into(),
        active: true,
    }
}

// ==================== SELECT ====================

#[test]
fn test_select_one() {
    let db = db();
    let q = db
        .select(&["*"])
        .and_where("id = ?", args![5])
        .build_one::<User>()
        .unwrap();
    assert_eq!(q.sql, "select * from user where id = ? limit 1");
    assert_eq!(q.args, vec![Value::Int(5)]);
}

#[test]
fn test_conditions_keep_call_order() {
    let db = db();
    let q = db
        .select(&["*"])
        .and_where("a = ?", args![1])
        .or_where("b = ?", args![2])
        .and_where("c = ?", args![3])
        .limit(10)
        .build_many::<User>()
        .unwrap();
    assert_eq!(
        q.sql,
        "select * from user where a = ? or b = ? and c = ? limit 10"
    );
    assert_eq!(q.args, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
}

#[test]
fn test_star_is_qualified_when_joined() {
    let db = db();
    let q = db
        .select(&["*"])
        .join("post on post.user_id = user.id")
        .and_where("post.title = ?", args!["hello"])
        .limit(5)
        .build_many::<User>()
        .unwrap();
    assert_eq!(
        q.sql,
        "select user.id, user.role, user.email, user.active from user \
         join post on post.user_id = user.id where post.title = ? limit 5"
    );
}

#[test]
fn test_full_select_clause_order() {
    let db = db();
    let q = db
        .select(&["role", "count(*) as n"])
        .left_join("post on post.user_id = user.id")
        .and_where("active = ?", args![true])
        .group_by("role")
        .and_having("count(*) > ?", args![1])
        .order_by("role asc")
        .order_by("n desc")
        .limit(10)
        .offset(20)
        .build_many::<User>()
        .unwrap();
    assert_eq!(
        q.sql,
        "select role, count(*) as n from user left join post on post.user_id = user.id \
         where active = ? group by role having count(*) > ? order by role asc, n desc \
         limit 10 offset 20"
    );
    assert_eq!(q.args, vec![Value::Bool(true), Value::Int(1)]);
}

#[test]
fn test_zero_offset_is_omitted() {
    let db = db();
    let q = db
        .select(&["id"])
        .limit(3)
        .offset(0)
        .build_many::<User>()
        .unwrap();
    assert_eq!(q.sql, "select id from user limit 3");
}

#[test]
fn test_empty_field_list_selects_star() {
    let db = db();
    let q = db.select(&[]).build_one::<Post>().unwrap();
    assert_eq!(q.sql, "select * from post limit 1");
}

#[test]
fn test_multi_row_select_requires_limit() {
    let db = db();
    let err = db.select(&["*"]).build_many::<User>().unwrap_err();
    assert!(matches!(err, OrmError::LimitRequired));

    let err = db.select(&["*"]).limit(0).build_many::<User>().unwrap_err();
    assert!(matches!(err, OrmError::LimitRequired));
}

#[test]
fn test_unregistered_destination() {
    let db: Db<()> = Db::new(());
    let err = db.select(&["*"]).build_one::<User>().unwrap_err();
    assert!(matches!(err, OrmError::UnregisteredModel(ref name) if name.contains("User")));
}

#[test]
fn test_rendering_is_repeatable() {
    let db = db();
    let q = db
        .select(&["*"])
        .and_where("role = ?", args!["admin"])
        .order_by("id")
        .limit(2);
    assert_eq!(q.build_many::<User>().unwrap(), q.build_many::<User>().unwrap());
}

#[test]
fn test_placeholder_mismatch() {
    let db = db();
    let err = db
        .select(&["*"])
        .and_where("id = ? and role = ?", args![1])
        .build_one::<User>()
        .unwrap_err();
    assert!(matches!(err, OrmError::Validation(_)));

    // quoted question marks are literal text
    let q = db
        .select(&["*"])
        .and_where("email like '%?'", args![])
        .build_one::<User>()
        .unwrap();
    assert!(q.args.is_empty());
}

// ==================== INSERT ====================

#[test]
fn test_insert_skips_zero_primary_key() {
    let db = db();
    let mut user = admin(0);
    let q = db.insert(&mut user).unwrap().build().unwrap();
    assert_eq!(q.sql, "insert into user (role, email, active) values (?, ?, ?)");
    assert_eq!(
        q.args,
        vec![
            Value::Text("admin".into()),
            Value::Text("root@example.com".into()),
            Value::Bool(true),
        ]
    );
}

#[test]
fn test_insert_keeps_explicit_primary_key() {
    let db = db();
    let mut user = admin(7);
    let sql = db.insert(&mut user).unwrap().to_sql().unwrap();
    assert_eq!(
        sql,
        "insert into user (id, role, email, active) values (?, ?, ?, ?)"
    );
}

#[tokio::test]
async fn test_insert_writes_back_generated_key() {
    let mock = Arc::new(MockExecutor::new());
    mock.expect(
        Expectation::exec("insert into user (role, email, active) values (?, ?, ?)")
            .returning_exec(1, Some(42)),
    );
    let db = Db::new(mock.clone());
    db.register::<User>().unwrap();

    let mut user = admin(0);
    let result = db.insert(&mut user).unwrap().exec().await.unwrap();
    assert_eq!(result.rows_affected, 1);
    assert_eq!(user.id, 42);
    mock.verify().unwrap();
}

#[tokio::test]
async fn test_insert_asks_executor_for_generated_key() {
    let db = Db::new(KeyedExecutor::default());
    db.register::<User>().unwrap();
    db.register::<Membership>().unwrap();

    let mut user = admin(0);
    db.insert(&mut user).unwrap().exec().await.unwrap();
    assert_eq!(user.id, 77);

    // explicit key: plain exec, nothing requested
    let mut user = admin(5);
    db.insert(&mut user).unwrap().exec().await.unwrap();
    assert_eq!(user.id, 5);

    let mut member = membership(0, 9);
    db.insert(&mut member).unwrap().exec().await.unwrap();
    assert_eq!(member.org_id, 77);
    assert_eq!(member.user_id, 9);

    assert_eq!(db.executor().requested(), ["id", "org_id"]);
}

#[test]
fn test_insert_with_only_generated_key_uses_default_values() {
    let db = db();
    let mut row = OnlyKey::default();
    let q = db.insert(&mut row).unwrap().build().unwrap();
    assert_eq!(q.sql, "insert into only_key default values");
    assert!(q.args.is_empty());
}

#[test]
fn test_insert_composite_key() {
    let db = db();

    let mut member = membership(0, 9);
    let q = db.insert(&mut member).unwrap().build().unwrap();
    assert_eq!(q.sql, "insert into membership (role, user_id) values (?, ?)");
    assert_eq!(q.args, vec![Value::Text("a".into()), Value::Int(9)]);

    let mut member = membership(3, 9);
    let sql = db.insert(&mut member).unwrap().to_sql().unwrap();
    assert_eq!(
        sql,
        "insert into membership (org_id, role, user_id) values (?, ?, ?)"
    );
}

// ==================== UPDATE ====================

#[test]
fn test_update_composite_key() {
    let db = db();
    let q = db.update(&membership(3, 9)).unwrap().build().unwrap();
    assert_eq!(
        q.sql,
        "update membership set role = ? where org_id = ? and user_id = ?"
    );
    assert_eq!(
        q.args,
        vec![Value::Text("a".into()), Value::Int(3), Value::Int(9)]
    );
}

#[test]
fn test_update_from_record() {
    let db = db();
    let q = db.update(&admin(7)).unwrap().build().unwrap();
    assert_eq!(
        q.sql,
        "update user set role = ?, email = ?, active = ? where id = ?"
    );
    assert_eq!(q.args.len(), 4);
    assert_eq!(q.args[3], Value::Int(7));
}

#[test]
fn test_update_columns_cover_model_once() {
    let db = db();
    let model = db.registry().model_of::<User>().unwrap();
    let sql = db.update(&admin(1)).unwrap().to_sql().unwrap();
    let (set, cond) = sql.split_once(" where ").unwrap();

    for column in model.columns() {
        let needle = format!("{} = ?", column.name);
        assert!(set.contains(&needle) != cond.contains(&needle), "{needle}");
    }
}

#[test]
fn test_manual_update_with_join() {
    let db = db();
    let q = db
        .manual_update("user")
        .join("post on post.user_id = user.id")
        .set("role = ?", args!["author"])
        .set("active = not active", args![])
        .and_where("post.id = ?", args![3])
        .build()
        .unwrap();
    assert_eq!(
        q.sql,
        "update user join post on post.user_id = user.id \
         set role = ?, active = not active where post.id = ?"
    );
    assert_eq!(q.args, vec![Value::Text("author".into()), Value::Int(3)]);
}

#[test]
fn test_update_without_set_fails() {
    let db = db();
    let err = db
        .manual_update("user")
        .and_where("id = ?", args![1])
        .build()
        .unwrap_err();
    assert!(matches!(err, OrmError::Validation(_)));
}

// ==================== DELETE ====================

#[test]
fn test_delete_from_record() {
    let db = db();
    let q = db.delete(&admin(9)).unwrap().build().unwrap();
    assert_eq!(q.sql, "delete from user where id = ?");
    assert_eq!(q.args, vec![Value::Int(9)]);
}

#[test]
fn test_delete_composite_key() {
    let db = db();
    let q = db.delete(&membership(3, 9)).unwrap().build().unwrap();
    assert_eq!(q.sql, "delete from membership where org_id = ? and user_id = ?");
    assert_eq!(q.args, vec![Value::Int(3), Value::Int(9)]);
}

#[test]
fn test_manual_delete() {
    let db = db();
    let q = db
        .manual_delete("post")
        .and_where("user_id = ?", args![4])
        .or_where("title = ?", args![""])
        .build()
        .unwrap();
    assert_eq!(q.sql, "delete from post where user_id = ? or title = ?");
}

// ==================== COUNT ====================

#[test]
fn test_count() {
    let db = db();
    assert_eq!(db.count("user", "").to_sql().unwrap(), "select count(*) from user");

    let q = db
        .count("user", "distinct user.id")
        .join("post on post.user_id = user.id")
        .and_where("user.active = ?", args![true])
        .build()
        .unwrap();
    assert_eq!(
        q.sql,
        "select count(distinct user.id) from user join post on post.user_id = user.id \
         where user.active = ?"
    );
}

#[test]
fn test_count_of_model() {
    let db = db();
    let sql = db.count_of::<Post>("id").unwrap().to_sql().unwrap();
    assert_eq!(sql, "select count(id) from post");
}
