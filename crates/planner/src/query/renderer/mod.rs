//! Defines the core rendering trait and context for converting AST to SQL.

use crate::query::{ast::common::TableRef, dialect::Dialect};

pub mod create_table;
pub mod delete;
pub mod drop_table;
pub mod expr;
pub mod insert;
pub mod select;
pub mod statement;
pub mod update;

/// A trait for any AST node that can be rendered into a SQL string.
pub trait Render {
    fn render(&self, renderer: &mut Renderer);
}

/// A context that holds the state during the rendering process.
///
/// Warehouse statements are rendered with inline literals, so the renderer
/// only accumulates SQL text and gives access to the dialect.
pub struct Renderer<'a> {
    pub sql: String,
    pub dialect: &'a dyn Dialect,
}

impl<'a> Renderer<'a> {
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self {
            sql: String::new(),
            dialect,
        }
    }

    /// Consumes the renderer and returns the final SQL string.
    pub fn finish(self) -> String {
        self.sql
    }

    pub fn render_table_ref(&mut self, table: &TableRef) {
        let table_sql = self.dialect.render_table_ref(table);
        self.sql.push_str(&table_sql);
    }

    pub fn push_identifier(&mut self, ident: &str) {
        let quoted = self.dialect.quote_identifier(ident);
        self.sql.push_str(&quoted);
    }

    /// Renders `items` separated by `, `.
    pub fn comma_separated<T: Render>(&mut self, items: &[T]) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(", ");
            }
            item.render(self);
        }
    }

    pub fn identifier_list(&mut self, idents: &[String]) {
        for (i, ident) in idents.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(", ");
            }
            self.push_identifier(ident);
        }
    }
}

/// Renders a single node to SQL text.
pub fn to_sql(node: &dyn Render, dialect: &dyn Dialect) -> String {
    let mut renderer = Renderer::new(dialect);
    node.render(&mut renderer);
    renderer.finish()
}
