//! Relationship inference over derived models.

use rowmap::{Db, Model, OrmError, RelationKind};

#[derive(Debug, Default, Model)]
struct Post {
    #[rowmap(primary)]
    id: i64,
    title: String,
    comments: Vec<Box<Comment>>,
    tags: Vec<Box<Tag>>,
}

#[derive(Debug, Default, Model)]
struct Comment {
    #[rowmap(primary)]
    id: i64,
    post_id: i64,
    body: String,
    post: Option<Box<Post>>,
}

#[derive(Debug, Default, Model)]
struct Tag {
    #[rowmap(primary)]
    id: i64,
    label: String,
    posts: Vec<Box<Post>>,
}

fn blog() -> Db<()> {
    let db = Db::new(());
    db.register::<Post>().unwrap();
    db.register::<Comment>().unwrap();
    db.register::<Tag>().unwrap();
    db
}

#[test]
fn reference_fields_are_not_columns() {
    let db = blog();
    let post = db.registry().model_of::<Post>().unwrap();
    let names: Vec<&str> = post.columns().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["id", "title"]);
}

#[test]
fn one_to_many_and_back() {
    let db = blog();

    let comments = db.registry().relationship("Post", "comments").unwrap().unwrap();
    assert_eq!(comments.kind, RelationKind::OneToMany);
    assert_eq!(comments.target, "Comment");
    assert_eq!(comments.join_column, "post_id");
    assert_eq!(
        comments.join_clause(),
        Some("comment on comment.post_id = post.id")
    );

    let post = db.registry().relationship("Comment", "post").unwrap().unwrap();
    assert_eq!(post.kind, RelationKind::ManyToOne);
    assert_eq!(post.join_clause(), Some("post on post.id = comment.post_id"));
}

#[test]
fn many_to_many_uses_sorted_link_table() {
    let db = blog();
    let tags = db.registry().relationship("Post", "tags").unwrap().unwrap();
    assert_eq!(tags.kind, RelationKind::ManyToMany);

    let link = tags.join_table.as_ref().unwrap();
    assert_eq!(link.name, "post_tag");
    assert_eq!(link.source_column, "post_id");
    assert_eq!(link.target_column, "tag_id");
    assert_eq!(
        tags.join_clause(),
        Some("post_tag on post_tag.post_id = post.id join tag on tag.id = post_tag.tag_id")
    );
}

#[test]
fn join_clause_feeds_select() {
    use rowmap::args;

    let db = blog();
    let join = db
        .registry()
        .relationship("Post", "comments")
        .unwrap()
        .and_then(|r| r.join_clause())
        .unwrap()
        .to_string();
    let q = db
        .select(&["*"])
        .join(&join)
        .and_where("comment.body like ?", args!["%rust%"])
        .limit(20)
        .build_many::<Post>()
        .unwrap();
    assert_eq!(
        q.sql,
        "select post.id, post.title from post join comment on comment.post_id = post.id \
         where comment.body like ? limit 20"
    );
}

#[test]
fn registry_is_frozen_after_inference() {
    #[derive(Debug, Default, Model)]
    struct Late {
        #[rowmap(primary)]
        id: i64,
    }

    let db = blog();
    assert_eq!(db.registry().relationships().unwrap().len(), 4);
    let err = db.register::<Late>().unwrap_err();
    assert!(matches!(err, OrmError::RegistryFrozen(_)));
}

#[test]
fn ambiguous_back_references_are_rejected() {
    #[derive(Debug, Default, Model)]
    struct Author {
        #[rowmap(primary)]
        id: i64,
        books: Vec<Box<Book>>,
    }

    #[derive(Debug, Default, Model)]
    struct Book {
        #[rowmap(primary)]
        id: i64,
        writer: Option<Box<Author>>,
        editor: Option<Box<Author>>,
    }

    let db = Db::new(());
    db.register::<Author>().unwrap();
    db.register::<Book>().unwrap();
    let err = db.registry().relationships().unwrap_err();
    assert!(matches!(err, OrmError::AmbiguousRelationship { .. }));
}
