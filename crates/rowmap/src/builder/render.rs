//! Canonical renderer.
//!
//! Every statement is an ordered list of [`Node`]s. Rendering walks the list
//! once, writing text and collecting arguments in the same pass, so argument
//! order always follows clause order.

use super::traits::BuiltQuery;
use super::where_builder::WhereBuilder;
use crate::value::Value;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

/// A join fragment, rendered verbatim after its keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub kind: JoinKind,
    pub text: String,
}

impl Join {
    pub fn inner(text: &str) -> Self {
        Self {
            kind: JoinKind::Inner,
            text: text.to_string(),
        }
    }

    pub fn left(text: &str) -> Self {
        Self {
            kind: JoinKind::Left,
            text: text.to_string(),
        }
    }
}

/// A `set` fragment of an update (`col = ?`, `n = n + 1`).
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub text: String,
    pub args: Vec<Value>,
}

pub(crate) enum Node<'q> {
    Select(&'q [String]),
    Count(&'q str),
    From(&'q str),
    Update(&'q str),
    DeleteFrom(&'q str),
    Insert {
        table: &'q str,
        columns: Vec<&'q str>,
        values: Vec<Value>,
    },
    Joins(&'q [Join]),
    Set(&'q [Assignment]),
    Where(&'q WhereBuilder),
    GroupBy(Option<&'q str>),
    Having(&'q WhereBuilder),
    OrderBy(&'q [String]),
    Limit(Option<u64>),
    Offset(Option<u64>),
}

pub(crate) fn render(nodes: Vec<Node<'_>>) -> BuiltQuery {
    let mut sql = String::with_capacity(128);
    let mut args = Vec::new();

    for node in nodes {
        match node {
            Node::Select(columns) => {
                sql.push_str("select ");
                sql.push_str(&columns.join(", "));
            }
            Node::Count(expr) => {
                let _ = write!(sql, "select count({expr})");
            }
            Node::From(table) => {
                let _ = write!(sql, " from {table}");
            }
            Node::Update(table) => {
                let _ = write!(sql, "update {table}");
            }
            Node::DeleteFrom(table) => {
                let _ = write!(sql, "delete from {table}");
            }
            Node::Insert {
                table,
                columns,
                values,
            } => {
                if columns.is_empty() {
                    let _ = write!(sql, "insert into {table} default values");
                } else {
                    let placeholders = vec!["?"; columns.len()].join(", ");
                    let _ = write!(
                        sql,
                        "insert into {table} ({}) values ({placeholders})",
                        columns.join(", ")
                    );
                }
                args.extend(values);
            }
            Node::Joins(joins) => {
                for join in joins {
                    let keyword = match join.kind {
                        JoinKind::Inner => " join ",
                        JoinKind::Left => " left join ",
                    };
                    sql.push_str(keyword);
                    sql.push_str(&join.text);
                }
            }
            Node::Set(assignments) => {
                for (i, set) in assignments.iter().enumerate() {
                    sql.push_str(if i == 0 { " set " } else { ", " });
                    sql.push_str(&set.text);
                    args.extend(set.args.iter().cloned());
                }
            }
            Node::Where(conditions) => render_conditions(&mut sql, &mut args, " where ", conditions),
            Node::GroupBy(group) => {
                if let Some(group) = group {
                    let _ = write!(sql, " group by {group}");
                }
            }
            Node::Having(conditions) => {
                render_conditions(&mut sql, &mut args, " having ", conditions)
            }
            Node::OrderBy(order) => {
                if !order.is_empty() {
                    let _ = write!(sql, " order by {}", order.join(", "));
                }
            }
            Node::Limit(limit) => {
                if let Some(n) = limit {
                    let _ = write!(sql, " limit {n}");
                }
            }
            Node::Offset(offset) => {
                if let Some(n) = offset.filter(|n| *n > 0) {
                    let _ = write!(sql, " offset {n}");
                }
            }
        }
    }

    BuiltQuery::new(sql, args)
}

fn render_conditions(
    sql: &mut String,
    args: &mut Vec<Value>,
    keyword: &str,
    conditions: &WhereBuilder,
) {
    for (i, condition) in conditions.conditions().iter().enumerate() {
        sql.push_str(if i == 0 {
            keyword
        } else {
            condition.conjunction.as_sql()
        });
        sql.push_str(&condition.text);
        args.extend(condition.args.iter().cloned());
    }
}
