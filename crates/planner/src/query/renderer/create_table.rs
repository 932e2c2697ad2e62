use crate::query::{
    ast::create_table::{ColumnDef, CreateTable, CreateTableAs},
    renderer::{Render, Renderer},
};

impl Render for CreateTable {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str(r.dialect.create_table_prefix(self.temp));
        r.sql.push(' ');
        r.render_table_ref(&self.table);
        r.sql.push_str(" (");
        r.comma_separated(&self.columns);
        r.sql.push(')');

        if let Some(options) = r.dialect.table_options(&self.layout) {
            r.sql.push(' ');
            r.sql.push_str(&options);
        }
    }
}

impl Render for ColumnDef {
    fn render(&self, r: &mut Renderer) {
        r.push_identifier(&self.name);
        r.sql.push(' ');

        let type_sql = r
            .dialect
            .render_data_type(&self.data_type, self.length.as_deref());
        r.sql.push_str(&type_sql);

        if let Some(default_value) = &self.default_value {
            r.sql.push_str(" DEFAULT ");
            r.sql.push_str(default_value);
        }

        if !self.is_nullable {
            r.sql.push_str(" NOT NULL");
        }
    }
}

impl Render for CreateTableAs {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str(r.dialect.create_table_prefix(false));
        r.sql.push(' ');
        r.render_table_ref(&self.table);

        let options = r.dialect.table_options(&self.layout);
        if r.dialect.ctas_wraps_select() {
            r.sql.push_str(" AS (");
            self.select.render(r);
            r.sql.push_str(") WITH DATA");
            if let Some(options) = options {
                r.sql.push(' ');
                r.sql.push_str(&options);
            }
        } else {
            if let Some(options) = options {
                r.sql.push(' ');
                r.sql.push_str(&options);
            }
            r.sql.push_str(" AS ");
            self.select.render(r);
        }
    }
}
