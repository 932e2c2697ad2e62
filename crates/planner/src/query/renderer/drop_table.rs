use crate::query::{
    ast::drop_table::DropTable,
    renderer::{Render, Renderer},
};

impl Render for DropTable {
    fn render(&self, r: &mut Renderer) {
        let sql = r.dialect.render_drop(&self.table, self.if_exists);
        r.sql.push_str(&sql);
    }
}
