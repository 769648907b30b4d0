//! HTML rendering
//!
//! Handlebars templates are embedded in the binary and registered once at
//! startup. Every page renders inside the `layout` partial, which draws the
//! sidebar, top navigation, breadcrumb and toast area from a [`Shell`].

use crate::auth::{DisplayUser, Role};
use crate::error::{AppError, AppResult};
use crate::flash::Flash;
use axum::response::Html;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use handlebars::Handlebars;
use serde::Serialize;
use serde_json::json;

pub const THEME_COOKIE: &str = "theme";

const PARTIALS: &[(&str, &str)] = &[
    ("layout", include_str!("../templates/layout.hbs")),
    ("table", include_str!("../templates/partials/table.hbs")),
    ("form_dialog", include_str!("../templates/partials/form_dialog.hbs")),
    ("field", include_str!("../templates/partials/field.hbs")),
];

const PAGES: &[(&str, &str)] = &[
    ("login", include_str!("../templates/login.hbs")),
    ("dashboard", include_str!("../templates/dashboard.hbs")),
    ("resource", include_str!("../templates/resource.hbs")),
    ("intake", include_str!("../templates/intake.hbs")),
    ("intake_done", include_str!("../templates/intake_done.hbs")),
];

pub struct Views {
    registry: Handlebars<'static>,
}

impl Views {
    pub fn new() -> AppResult<Self> {
        let mut registry = Handlebars::new();

        for (name, source) in PARTIALS {
            registry
                .register_partial(name, *source)
                .map_err(|e| AppError::Config(format!("partial '{}': {}", name, e)))?;
        }
        for (name, source) in PAGES {
            registry
                .register_template_string(name, *source)
                .map_err(|e| AppError::Config(format!("template '{}': {}", name, e)))?;
        }

        Ok(Self { registry })
    }

    /// Render a page inside the layout
    pub fn page<T: Serialize>(&self, name: &str, shell: &Shell, page: &T) -> AppResult<Html<String>> {
        let html = self
            .registry
            .render(name, &json!({ "shell": shell, "page": page }))?;
        Ok(Html(html))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn from_jar(jar: &CookieJar) -> Self {
        match jar.get(THEME_COOKIE).map(|c| c.value()) {
            Some("dark") => Theme::Dark,
            _ => Theme::Light,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn cookie(self) -> Cookie<'static> {
        Cookie::build((THEME_COOKIE, self.as_str()))
            .path("/")
            .max_age(time::Duration::days(365))
            .same_site(SameSite::Lax)
            .build()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Crumb {
    pub label: String,
    pub href: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub href: &'static str,
    pub active: bool,
}

const ADMIN_NAV: &[(&str, &str)] = &[
    ("Dashboard", "/admin/dashboard"),
    ("Datel", "/admin/datel"),
    ("Kategori Paket", "/admin/kategori-paket"),
    ("Promo", "/admin/promo"),
    ("Sales", "/admin/sales"),
    ("Settings", "/admin/settings"),
];

const AGENCY_NAV: &[(&str, &str)] = &[("Dashboard", "/admin/dashboard"), ("Sales", "/admin/sales")];

/// Sidebar entries for a role, with the current section highlighted
pub fn navigation(role: Role, current_path: &str) -> Vec<NavItem> {
    let entries = if role.can_manage_master_data() {
        ADMIN_NAV
    } else {
        AGENCY_NAV
    };

    entries
        .iter()
        .map(|&(label, href)| NavItem {
            label,
            href,
            active: current_path == href || current_path.starts_with(&format!("{}/", href)),
        })
        .collect()
}

/// Chrome around a page
#[derive(Debug, Clone, Serialize)]
pub struct Shell {
    pub title: String,
    pub breadcrumb: Vec<Crumb>,
    pub nav: Vec<NavItem>,
    pub user: Option<DisplayUser>,
    pub theme: Theme,
    pub toast: Option<Flash>,
}

impl Shell {
    /// Shell for pages outside the dashboard (login, intake)
    pub fn public(title: impl Into<String>, theme: Theme, toast: Option<Flash>) -> Self {
        Self {
            title: title.into(),
            breadcrumb: Vec::new(),
            nav: Vec::new(),
            user: None,
            theme,
            toast,
        }
    }

    /// Shell for dashboard pages
    pub fn admin(
        title: impl Into<String>,
        current_path: &str,
        user: &DisplayUser,
        theme: Theme,
        toast: Option<Flash>,
    ) -> Self {
        let title = title.into();
        let mut breadcrumb = vec![Crumb {
            label: "Admin".to_string(),
            href: Some("/admin/dashboard".to_string()),
        }];
        breadcrumb.push(Crumb {
            label: title.clone(),
            href: None,
        });

        Self {
            title,
            breadcrumb,
            nav: navigation(user.role, current_path),
            user: Some(user.clone()),
            theme,
            toast,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FormDialog, FormField};
    use crate::pagination::{PageRequest, Pagination};
    use crate::table::{Column, DataTable, ListState, Row, RowAction};

    fn admin() -> DisplayUser {
        DisplayUser {
            name: "Admin <Witel>".into(),
            role: Role::Admin,
        }
    }

    #[test]
    fn test_all_templates_register() {
        assert!(Views::new().is_ok());
    }

    #[test]
    fn test_navigation_by_role() {
        let admin_nav = navigation(Role::Admin, "/admin/datel");
        assert_eq!(admin_nav.len(), 6);
        assert!(admin_nav.iter().find(|n| n.href == "/admin/datel").unwrap().active);
        assert!(!admin_nav.iter().find(|n| n.href == "/admin/dashboard").unwrap().active);

        let agency_nav = navigation(Role::Agency, "/admin/sales/3");
        let labels: Vec<&str> = agency_nav.iter().map(|n| n.label).collect();
        assert_eq!(labels, vec!["Dashboard", "Sales"]);
        assert!(agency_nav[1].active);
    }

    #[test]
    fn test_theme_cookie_round_trip() {
        let jar = CookieJar::new().add(Theme::Dark.cookie());
        assert_eq!(Theme::from_jar(&jar), Theme::Dark);
        assert_eq!(Theme::from_jar(&CookieJar::new()), Theme::Light);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }

    #[test]
    fn test_resource_page_renders_table_and_dialog() {
        let views = Views::new().unwrap();
        let state = ListState::new("/admin/datel", PageRequest::default());
        let table = DataTable::new(
            vec![Column::new("nama", "Nama")],
            vec![Row { id: "1".into(), cells: vec!["<b>Bandung</b>".into()] }],
        )
        .selectable(true);
        let pagination = Pagination { page: 1, limit: 10, total: 1, total_pages: 1 };
        let table_view = table.view(&state, &pagination, |row| {
            vec![RowAction::destructive("Hapus", format!("/admin/datel/{}/delete", row.id), "Yakin?")]
        });
        let dialog = FormDialog::new("Tambah Datel", "/admin/datel", "/admin/datel")
            .fields(vec![FormField::text("nama", "Nama").required()]);

        let shell = Shell::admin("Datel", "/admin/datel", &admin(), Theme::Dark, Some(Flash::success("ok")));
        let html = views
            .page(
                "resource",
                &shell,
                &json!({
                    "title": "Datel",
                    "new_href": state.href_extra("new", "1"),
                    "table": table_view,
                    "dialog": dialog,
                }),
            )
            .unwrap()
            .0;

        assert!(html.contains("&lt;b&gt;Bandung&lt;/b&gt;"));
        assert!(html.contains("Admin &lt;Witel&gt;"));
        assert!(html.contains("formaction=\"/admin/datel/1/delete\""));
        assert!(html.contains("name=\"nama\""));
        assert!(html.contains("Tambah Datel"));
        assert!(html.contains("data-theme=\"dark\""));
        assert!(html.contains("1 - 1"));
    }
}
