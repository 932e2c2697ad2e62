use crate::query::{
    ast::statement::{RenameTable, TransactionControl, TruncateTable},
    renderer::{Render, Renderer},
};

impl Render for TruncateTable {
    fn render(&self, r: &mut Renderer) {
        let sql = r.dialect.render_truncate(&self.table);
        r.sql.push_str(&sql);
    }
}

impl Render for RenameTable {
    fn render(&self, r: &mut Renderer) {
        let sql = r.dialect.render_rename(&self.table, &self.new_name);
        r.sql.push_str(&sql);
    }
}

impl Render for TransactionControl {
    fn render(&self, r: &mut Renderer) {
        let keyword = match self {
            TransactionControl::Begin => r.dialect.begin_transaction(),
            TransactionControl::Commit => r.dialect.commit_transaction(),
            TransactionControl::Rollback => r.dialect.rollback_transaction(),
        };
        r.sql.push_str(keyword);
    }
}
