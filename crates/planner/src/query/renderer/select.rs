use crate::query::{
    ast::select::{FromClause, FromSource, Select},
    renderer::{Render, Renderer},
};

impl Render for Select {
    fn render(&self, r: &mut Renderer) {
        // 1. SELECT clause
        r.sql.push_str("SELECT ");
        r.comma_separated(&self.columns);

        // 2. FROM
        if let Some(from) = &self.from {
            r.sql.push_str(" FROM ");
            from.render(r);
        }

        // 3. WHERE
        if let Some(where_clause) = &self.where_clause {
            r.sql.push_str(" WHERE ");
            where_clause.render(r);
        }
    }
}

/// Renders the source without the `FROM` keyword so it can follow `USING`
/// or an `UPDATE ... FROM` as well.
impl Render for FromClause {
    fn render(&self, r: &mut Renderer) {
        match &self.source {
            FromSource::Table(table) => r.render_table_ref(table),
            FromSource::Subquery(select) => {
                r.sql.push('(');
                select.render(r);
                r.sql.push(')');
            }
        }
        if let Some(alias) = &self.alias {
            r.sql.push_str(" AS ");
            r.push_identifier(alias);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        query::{
            ast::select::{FromClause, FromSource, Select},
            dialect::Redshift,
            eq, ident,
            renderer::to_sql,
            string,
        },
        table_ref,
    };

    #[test]
    fn test_render_select_from_subquery() {
        let inner = Select {
            columns: vec![ident("id")],
            from: Some(FromClause::table(table_ref!("public", "stage"), None)),
            where_clause: None,
        };
        let outer = Select {
            columns: vec![ident("id")],
            from: Some(FromClause {
                source: FromSource::Subquery(Box::new(inner)),
                alias: Some("a".into()),
            }),
            where_clause: Some(eq(ident("id"), string("7"))),
        };

        assert_eq!(
            to_sql(&outer, &Redshift),
            "SELECT \"id\" FROM (SELECT \"id\" FROM \"public\".\"stage\") AS \"a\" WHERE \"id\" = '7'"
        );
    }
}
