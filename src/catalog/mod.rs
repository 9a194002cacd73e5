pub mod template;
pub mod types;

use std::collections::HashSet;
use std::path::Path;

use crate::utils::config::ConfigError;

pub use types::*;

const BUILTIN_CATALOG: &str = include_str!("default.yaml");

impl Catalog {
    /// The check set shipped with the binary
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::parse(BUILTIN_CATALOG, Path::new("<builtin>"))
    }

    /// Load a catalog file, replacing the built-in check set
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Built-in catalog unless a path is given
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Self::builtin(),
        }
    }

    pub fn parse(content: &str, source: &Path) -> Result<Self, ConfigError> {
        let mut catalog: Catalog =
            serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
                path: source.to_path_buf(),
                source: e,
            })?;
        catalog.validate()?;
        for area in &mut catalog.areas {
            for check in &mut area.checks {
                check.area = area.title.clone();
            }
        }
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.login.path.starts_with('/') {
            return Err(ConfigError::InvalidCatalog(format!(
                "login path '{}' must start with '/'",
                self.login.path
            )));
        }

        let mut names = HashSet::new();
        for area in &self.areas {
            if area.checks.is_empty() {
                return Err(ConfigError::InvalidCatalog(format!(
                    "area '{}' has no checks",
                    area.title
                )));
            }
            for check in &area.checks {
                if !check.path.starts_with('/') {
                    return Err(ConfigError::InvalidCatalog(format!(
                        "check '{}': path '{}' must start with '/'",
                        check.name, check.path
                    )));
                }
                if !names.insert(check.name.as_str()) {
                    return Err(ConfigError::InvalidCatalog(format!(
                        "check name '{}' is used more than once",
                        check.name
                    )));
                }
                if let Some(rule) = &check.access {
                    if rule.allowed_roles.is_empty() {
                        return Err(ConfigError::InvalidCatalog(format!(
                            "check '{}': access rule allows no roles",
                            check.name
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Find a check by name in any area
    pub fn find_check(&self, name: &str) -> Option<&EndpointCheck> {
        self.areas
            .iter()
            .flat_map(|a| a.checks.iter())
            .find(|c| c.name == name)
    }

    /// Number of endpoint checks per role (login excluded)
    pub fn check_count(&self) -> usize {
        self.areas.iter().map(|a| a.checks.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::HttpMethod;

    #[test]
    fn test_builtin_catalog_order() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.login.path, "/auth/login");

        let names: Vec<&str> = catalog
            .areas
            .iter()
            .flat_map(|a| a.checks.iter())
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "Auth Me",
                "Tasks",
                "Task Counts",
                "Companies",
                "Contacts",
                "Photo Reports GET",
                "Photo Reports POST",
                "Options",
                "Dashboard",
            ]
        );
        assert_eq!(catalog.check_count(), 9);
        assert_eq!(catalog.areas[0].banner(), "👤 USER INFO TESTS");
    }

    #[test]
    fn test_companies_restricted_to_admin() {
        let catalog = Catalog::builtin().unwrap();
        let companies = catalog.find_check("Companies").unwrap();

        assert_eq!(
            companies.expectation_for("admin"),
            Expectation::Allowed { status: 200 }
        );
        assert_eq!(
            companies.expectation_for("customer"),
            Expectation::Denied { status: 401 }
        );
        assert_eq!(companies.result_name("customer"), "Companies (customer)");
    }

    #[test]
    fn test_checks_know_their_area() {
        let catalog = Catalog::builtin().unwrap();
        for area in &catalog.areas {
            assert!(area.checks.iter().all(|c| c.area == area.title));
        }
        assert_eq!(
            catalog.find_check("Companies").unwrap().area,
            "COMPANIES TESTS"
        );
    }

    #[test]
    fn test_photo_report_post_payload() {
        let catalog = Catalog::builtin().unwrap();
        let post = catalog.find_check("Photo Reports POST").unwrap();

        assert_eq!(post.method, HttpMethod::Post);
        assert_eq!(post.require, vec!["id", "status"]);
        let body = post.body.as_ref().unwrap();
        assert_eq!(body["taskId"], "test-task-id");
        assert_eq!(body["damages"][0]["part"], "aluprofil");
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let yaml = r#"
title: t
login:
  path: /login
  message: ok
areas:
  - title: A
    checks:
      - { name: X, path: /a, message: ok }
      - { name: X, path: /b, message: ok }
"#;
        let err = Catalog::parse(yaml, Path::new("c.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCatalog(_)));
    }

    #[test]
    fn test_rejects_relative_path() {
        let yaml = r#"
title: t
login:
  path: auth/login
  message: ok
"#;
        assert!(Catalog::parse(yaml, Path::new("c.yaml")).is_err());
    }
}
