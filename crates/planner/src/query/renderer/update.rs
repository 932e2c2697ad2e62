use crate::query::{
    ast::update::{Assignment, Update},
    renderer::{Render, Renderer},
};

impl Render for Update {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("UPDATE ");
        r.render_table_ref(&self.table);
        if let Some(alias) = &self.alias {
            r.sql.push_str(" AS ");
            r.push_identifier(alias);
        }

        if r.dialect.update_from_before_set() {
            render_from(self, r);
            render_set(self, r);
        } else {
            render_set(self, r);
            render_from(self, r);
        }

        if let Some(where_clause) = &self.where_clause {
            r.sql.push_str(" WHERE ");
            where_clause.render(r);
        }
    }
}

fn render_set(update: &Update, r: &mut Renderer) {
    r.sql.push_str(" SET ");
    r.comma_separated(&update.assignments);
}

fn render_from(update: &Update, r: &mut Renderer) {
    if !update.from.is_empty() {
        r.sql.push_str(" FROM ");
        r.comma_separated(&update.from);
    }
}

impl Render for Assignment {
    fn render(&self, r: &mut Renderer) {
        r.push_identifier(&self.column);
        r.sql.push_str(" = ");
        self.value.render(r);
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        query::{
            aliased,
            ast::{
                select::FromClause,
                update::{Assignment, Update},
            },
            coalesce_empty,
            dialect::{Snowflake, Teradata},
            eq,
            renderer::to_sql,
            table_qualified,
        },
        table_ref,
    };

    fn update() -> Update {
        let dest = table_ref!("s", "users");
        Update {
            table: dest.clone(),
            alias: None,
            assignments: vec![Assignment {
                column: "name".into(),
                value: coalesce_empty(aliased("src", "name")),
            }],
            from: vec![FromClause::table(table_ref!("s", "stage"), Some("src"))],
            where_clause: Some(eq(
                table_qualified(&dest, "id"),
                coalesce_empty(aliased("src", "id")),
            )),
        }
    }

    #[test]
    fn test_render_update_from() {
        assert_eq!(
            to_sql(&update(), &Snowflake),
            concat!(
                "UPDATE \"s\".\"users\" SET \"name\" = COALESCE(\"src\".\"name\", '') ",
                "FROM \"s\".\"stage\" AS \"src\" ",
                "WHERE \"s\".\"users\".\"id\" = COALESCE(\"src\".\"id\", '')"
            )
        );
    }

    #[test]
    fn test_render_teradata_from_before_set() {
        let sql = to_sql(&update(), &Teradata);
        assert!(sql.starts_with(
            "UPDATE \"s\".\"users\" FROM \"s\".\"stage\" AS \"src\" SET \"name\" ="
        ));
    }
}
