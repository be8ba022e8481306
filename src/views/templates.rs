use handlebars::Handlebars;
use std::sync::Arc;

pub type Hbs = Arc<Handlebars<'static>>;

const TEMPLATES: &[(&str, &str)] = &[
    ("layouts/base", include_str!("../../templates/layouts/base.hbs")),
    ("pages/index", include_str!("../../templates/pages/index.hbs")),
    ("pages/all_orders", include_str!("../../templates/pages/all_orders.hbs")),
    ("pages/edit_user", include_str!("../../templates/pages/edit_user.hbs")),
    ("pages/edit_order", include_str!("../../templates/pages/edit_order.hbs")),
    ("pages/handle_balance", include_str!("../../templates/pages/handle_balance.hbs")),
    ("pages/not_found", include_str!("../../templates/pages/not_found.hbs")),
];

/// Builds the registry once at startup; templates are compiled into the binary.
pub fn build_handlebars() -> Hbs {
    let mut hb = Handlebars::new();

    for (name, source) in TEMPLATES {
        hb.register_template_string(name, source)
            .unwrap_or_else(|e| panic!("template {name}: {e}"));
    }

    Arc::new(hb)
}
