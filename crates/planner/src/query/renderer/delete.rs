use crate::query::{
    ast::delete::Delete,
    renderer::{Render, Renderer},
};

impl Render for Delete {
    fn render(&self, r: &mut Renderer) {
        if r.dialect.delete_requires_from() {
            r.sql.push_str("DELETE FROM ");
        } else {
            r.sql.push_str("DELETE ");
        }
        r.render_table_ref(&self.table);
        if let Some(alias) = &self.alias {
            r.sql.push_str(" AS ");
            r.push_identifier(alias);
        }

        if let Some(using) = &self.using {
            r.sql.push_str(" USING ");
            using.render(r);
        }

        if let Some(where_clause) = &self.where_clause {
            r.sql.push_str(" WHERE ");
            where_clause.render(r);
        }
    }
}
