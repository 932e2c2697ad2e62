use crate::query::{
    ast::expr::{BinaryOp, BinaryOperator, Expr, FunctionCall, Ident, Qualifier},
    renderer::{Render, Renderer},
};

impl Render for Expr {
    fn render(&self, r: &mut Renderer) {
        match self {
            Expr::Identifier(ident) => ident.render(r),
            Expr::String(value) => {
                let quoted = r.dialect.quote_string(value);
                r.sql.push_str(&quoted);
            }
            Expr::Literal(raw) => r.sql.push_str(raw),
            Expr::BinaryOp(op) => op.render(r),
            Expr::FunctionCall(func) => func.render(r),
            Expr::Cast { expr, data_type } => {
                r.sql.push_str("CAST(");
                expr.render(r);
                r.sql.push_str(" AS ");
                r.sql.push_str(data_type);
                r.sql.push(')');
            }
            Expr::Alias { expr, alias } => {
                expr.render(r);
                r.sql.push_str(" AS ");
                r.push_identifier(alias);
            }
            Expr::RowNumber {
                partition_by,
                order_by,
            } => {
                r.sql.push_str("ROW_NUMBER() OVER (");
                if !partition_by.is_empty() {
                    r.sql.push_str("PARTITION BY ");
                    r.comma_separated(partition_by);
                }
                if !order_by.is_empty() {
                    if !partition_by.is_empty() {
                        r.sql.push(' ');
                    }
                    r.sql.push_str("ORDER BY ");
                    r.comma_separated(order_by);
                }
                r.sql.push(')');
            }
            Expr::Exists(select) => {
                r.sql.push_str("EXISTS (");
                select.render(r);
                r.sql.push(')');
            }
            Expr::Nested(inner) => {
                r.sql.push('(');
                inner.render(r);
                r.sql.push(')');
            }
        }
    }
}

impl Render for Ident {
    fn render(&self, r: &mut Renderer) {
        match &self.qualifier {
            Some(Qualifier::Alias(alias)) => {
                r.push_identifier(alias);
                r.sql.push('.');
            }
            Some(Qualifier::Table(table)) => {
                r.render_table_ref(table);
                r.sql.push('.');
            }
            None => {}
        }
        r.push_identifier(&self.name);
    }
}

impl Render for BinaryOp {
    fn render(&self, r: &mut Renderer) {
        self.left.render(r);

        let op_str = match self.op {
            BinaryOperator::Eq => " = ",
            BinaryOperator::NotEq => " <> ",
            BinaryOperator::And => " AND ",
            BinaryOperator::Or => " OR ",
        };
        r.sql.push_str(op_str);

        self.right.render(r);
    }
}

impl Render for FunctionCall {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str(&self.name);
        r.sql.push('(');
        if self.wildcard {
            r.sql.push('*');
        } else {
            r.comma_separated(&self.args);
        }
        r.sql.push(')');
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        query::{
            aliased, and_all, cast, coalesce_empty, dialect::{BigQuery, Snowflake, Synapse},
            eq, ident, not_eq, or_all, renderer::to_sql, string, table_qualified,
            ast::expr::Expr,
        },
        table_ref,
    };

    #[test]
    fn test_render_coalesce_and_cast() {
        let expr = cast(coalesce_empty(ident("price")), "NUMBER(38,2)");
        assert_eq!(
            to_sql(&expr, &Snowflake),
            "CAST(COALESCE(\"price\", '') AS NUMBER(38,2))"
        );
    }

    #[test]
    fn test_render_qualified_identifiers() {
        let table = table_ref!("dbo", "users");
        assert_eq!(to_sql(&aliased("src", "id"), &Synapse), "[src].[id]");
        assert_eq!(
            to_sql(&table_qualified(&table, "id"), &Synapse),
            "[dbo].[users].[id]"
        );
    }

    #[test]
    fn test_render_and_or_chains() {
        let changed = or_all(vec![
            not_eq(ident("a"), string("")),
            not_eq(ident("b"), string("")),
        ]);
        let mut parts = vec![eq(ident("id"), string("1"))];
        parts.extend(changed);
        let expr = and_all(parts).unwrap();
        assert_eq!(
            to_sql(&expr, &BigQuery),
            "`id` = '1' AND (`a` <> '' OR `b` <> '')"
        );
    }

    #[test]
    fn test_render_row_number() {
        let expr = Expr::RowNumber {
            partition_by: vec![ident("id")],
            order_by: vec![ident("id")],
        };
        assert_eq!(
            to_sql(&expr, &Snowflake),
            "ROW_NUMBER() OVER (PARTITION BY \"id\" ORDER BY \"id\")"
        );
    }

    #[test]
    fn test_and_all_empty_is_none() {
        assert!(and_all(vec![]).is_none());
        assert!(or_all(vec![]).is_none());
    }
}
