use crate::query::{
    ast::insert::Insert,
    renderer::{Render, Renderer},
};

impl Render for Insert {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("INSERT INTO ");
        r.render_table_ref(&self.table);
        r.sql.push_str(" (");
        r.identifier_list(&self.columns);
        r.sql.push_str(") ");
        self.select.render(r);
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        query::{
            ast::{
                insert::Insert,
                select::{FromClause, Select},
            },
            coalesce_empty,
            dialect::{Exasol, Synapse},
            ident,
            renderer::to_sql,
            string,
        },
        table_ref,
    };

    fn insert_with_timestamp() -> Insert {
        Insert {
            table: table_ref!("in_c", "users"),
            columns: vec!["id".into(), "name".into(), "_timestamp".into()],
            select: Select {
                columns: vec![
                    coalesce_empty(ident("id")),
                    coalesce_empty(ident("name")),
                    string("2024-01-01 00:00:00"),
                ],
                from: Some(FromClause::table(table_ref!("in_c", "__temp_1"), None)),
                where_clause: None,
            },
        }
    }

    #[test]
    fn test_render_insert_select() {
        assert_eq!(
            to_sql(&insert_with_timestamp(), &Exasol),
            concat!(
                "INSERT INTO \"in_c\".\"users\" (\"id\", \"name\", \"_timestamp\") ",
                "SELECT COALESCE(\"id\", ''), COALESCE(\"name\", ''), '2024-01-01 00:00:00' ",
                "FROM \"in_c\".\"__temp_1\""
            )
        );
    }

    #[test]
    fn test_render_insert_select_synapse_quoting() {
        let sql = to_sql(&insert_with_timestamp(), &Synapse);
        assert!(sql.starts_with("INSERT INTO [in_c].[users] ([id], [name], [_timestamp]) "));
    }
}
