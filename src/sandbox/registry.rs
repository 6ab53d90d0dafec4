use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::config::ToolchainConfig;
use crate::error::ExecError;

use super::compiled::{Java, Native, TypeScript};
use super::interpreted::Interpreted;
use super::placeholder::Placeholder;
use super::runner::Runner;

/// Maps a language identifier to the runner that executes it
#[derive(Clone, Default)]
pub struct Registry {
    runners: BTreeMap<String, Arc<dyn Runner>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in language, with program names taken from `toolchains` when set
    pub fn standard(toolchains: &HashMap<String, ToolchainConfig>) -> Self {
        let tool = |id: &str| toolchains.get(id).cloned().unwrap_or_default();
        let mut registry = Self::new();

        for (id, runner) in [
            ("python", Interpreted::python()),
            ("javascript", Interpreted::javascript()),
            ("go", Interpreted::go()),
            ("swift", Interpreted::swift()),
            ("ruby", Interpreted::ruby()),
            ("bash", Interpreted::bash()),
        ] {
            let runner = match tool(id).run {
                Some(program) => runner.with_program(program),
                None => runner,
            };
            registry.register(id, runner);
        }

        for (id, runner) in [("c", Native::c()), ("cpp", Native::cpp()), ("rust", Native::rust())] {
            let runner = match tool(id).compile {
                Some(compiler) => runner.with_compiler(compiler),
                None => runner,
            };
            registry.register(id, runner);
        }

        let ToolchainConfig { compile, run } = tool("java");
        let mut java = Java::new();
        if let Some(compiler) = compile {
            java = java.with_compiler(compiler);
        }
        if let Some(runtime) = run {
            java = java.with_runtime(runtime);
        }
        registry.register("java", java);

        let ToolchainConfig { compile, run } = tool("typescript");
        let mut typescript = TypeScript::new();
        if let Some(compiler) = compile {
            typescript = typescript.with_compiler(compiler);
        }
        if let Some(runtime) = run {
            typescript = typescript.with_runtime(runtime);
        }
        registry.register("typescript", typescript);

        registry.register("sql", Placeholder::sql());
        registry.alias("sh", "bash");

        registry
    }

    /// Registers `runner` under `id`, replacing any runner already there
    pub fn register(&mut self, id: impl Into<String>, runner: impl Runner + 'static) -> &mut Self {
        self.runners.insert(id.into(), Arc::new(runner));
        self
    }

    /// Makes `alias` resolve to the runner registered as `target`
    pub fn alias(&mut self, alias: impl Into<String>, target: &str) -> &mut Self {
        if let Some(runner) = self.runners.get(target).cloned() {
            self.runners.insert(alias.into(), runner);
        } else {
            log::warn!("Cannot alias unknown language {target}");
        }
        self
    }

    pub fn resolve(&self, language: &str) -> Result<&dyn Runner, ExecError> {
        self.runners
            .get(language)
            .map(|runner| runner.as_ref())
            .ok_or_else(|| ExecError::Unsupported(language.to_string()))
    }

    /// Registered identifiers in sorted order
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.runners.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.languages()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_languages() {
        let registry = Registry::standard(&HashMap::new());
        let languages: Vec<&str> = registry.languages().collect();
        assert_eq!(
            languages,
            vec![
                "bash",
                "c",
                "cpp",
                "go",
                "java",
                "javascript",
                "python",
                "ruby",
                "rust",
                "sh",
                "sql",
                "swift",
                "typescript",
            ]
        );
    }

    #[test]
    fn test_resolve_labels() {
        let registry = Registry::standard(&HashMap::new());
        assert_eq!(registry.resolve("cpp").unwrap().label(), "C++");
        assert_eq!(registry.resolve("sh").unwrap().label(), "Bash");
        assert_eq!(registry.resolve("typescript").unwrap().label(), "TypeScript");
    }

    #[test]
    fn test_unknown_language_is_unsupported() {
        let registry = Registry::standard(&HashMap::new());
        let err = registry.resolve("cobol").err().unwrap();
        assert_eq!(err.to_string(), "unsupported language: cobol");
        // Identifiers are matched exactly
        assert!(registry.resolve("Python").is_err());
    }

    #[test]
    fn test_register_replaces_runner() {
        let mut registry = Registry::new();
        registry.register("sql", Placeholder::new("SQL", "first"));
        registry.register("sql", Placeholder::new("Query", "second"));
        assert_eq!(registry.resolve("sql").unwrap().label(), "Query");
    }
}
