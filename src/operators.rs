//! Declarative repomod built from a [`RepomodConfig`]
//!
//! Each configured operation is compiled once into a [`Rule`]. The hooks then
//! evaluate the rules against paths relative to the run root:
//!
//! - `handle_file` decides the fate of a file. The first `delete` or `rename`
//!   rule (in configuration order) that matches wins; every matching `copy`
//!   mapping adds a copy of the original. Files that are kept, moved or copied
//!   are re-read with `UpsertFile` so `replace` rules see them under their
//!   final path.
//! - `handle_data` runs every `replace` rule whose patterns match the path and
//!   stages the result if anything changed.
//! - `handle_directory` walks children only when no `include` patterns are
//!   configured. With `include`, the interpreter's glob fast path already
//!   dispatched every selected file under the root.

use glob::Pattern;
use log::debug;
use regex::Regex;

use crate::command::{Command, Options};
use crate::config::{Operation, PathMapping, RepomodConfig};
use crate::error::{Error, Result};
use crate::path::{self, compile_patterns, match_options};
use crate::repomod::{walk_directory, DataApi, DirectoryApi, FileApi, Repomod};

/// A compiled `from`/`to` mapping
#[derive(Debug, Clone)]
struct Mapping {
    from: Regex,
    to: String,
}

impl Mapping {
    fn compile(operator: &str, mapping: &PathMapping) -> Result<Self> {
        if mapping.to.trim().is_empty() {
            return Err(Error::Operator {
                operator: operator.to_string(),
                message: format!("Mapping for '{}' has an empty target", mapping.from),
            });
        }
        Ok(Self {
            from: Regex::new(&mapping.from)?,
            to: mapping.to.clone(),
        })
    }

    /// Expand `$N` references in the target with the captures of `from`.
    ///
    /// A `$` followed by a single digit is a group reference; a group that
    /// did not participate expands to nothing. Anything else is literal, so
    /// `$1_backup` means group 1 followed by `_backup`.
    fn apply(&self, relative: &str) -> Option<String> {
        let captures = self.from.captures(relative)?;
        let mut result = String::with_capacity(self.to.len());
        let mut chars = self.to.chars().peekable();

        while let Some(ch) = chars.next() {
            if ch == '$' {
                if let Some(index) = chars.peek().and_then(|c| c.to_digit(10)) {
                    chars.next();
                    if let Some(group) = captures.get(index as usize) {
                        result.push_str(group.as_str());
                    }
                    continue;
                }
            }
            result.push(ch);
        }

        Some(result)
    }
}

#[derive(Debug, Clone)]
enum Rule {
    Delete(Vec<Pattern>),
    Rename(Vec<Mapping>),
    Copy(Vec<Mapping>),
    Replace {
        patterns: Vec<Pattern>,
        find: Regex,
        with: String,
    },
}

impl Rule {
    fn compile(operation: &Operation) -> Result<Self> {
        Ok(match operation {
            Operation::Delete { delete } => Rule::Delete(compile_patterns(&delete.patterns)?),
            Operation::Rename { rename } => Rule::Rename(
                rename
                    .mappings
                    .iter()
                    .map(|m| Mapping::compile("rename", m))
                    .collect::<Result<_>>()?,
            ),
            Operation::Copy { copy } => Rule::Copy(
                copy.mappings
                    .iter()
                    .map(|m| Mapping::compile("copy", m))
                    .collect::<Result<_>>()?,
            ),
            Operation::Replace { replace } => Rule::Replace {
                patterns: compile_patterns(&replace.patterns)?,
                find: Regex::new(&replace.find)?,
                with: replace.with.clone(),
            },
        })
    }
}

fn any_match(patterns: &[Pattern], relative: &str) -> bool {
    let options = match_options();
    patterns.iter().any(|p| p.matches_with(relative, options))
}

/// A [`Repomod`] driven by a YAML configuration
#[derive(Debug, Clone)]
pub struct DeclarativeRepomod {
    name: String,
    root: String,
    include: Vec<String>,
    exclude: Vec<String>,
    rules: Vec<Rule>,
}

impl DeclarativeRepomod {
    /// Compile `config` for a run rooted at `root`.
    ///
    /// `root` must be spelled the way the run's backend resolves it, so an
    /// absolute path for `HostBackend`. Fails on the first invalid glob or
    /// regular expression.
    pub fn new(config: &RepomodConfig, root: &str) -> Result<Self> {
        path::validate(root)?;
        // Surface bad fast-path globs before the run starts
        compile_patterns(&config.include)?;
        compile_patterns(&config.exclude)?;

        let rules = config
            .operations
            .iter()
            .map(Rule::compile)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: config
                .name
                .clone()
                .unwrap_or_else(|| "declarative".to_string()),
            root: path::canonicalize(root),
            include: config.include.clone(),
            exclude: config.exclude.clone(),
            rules,
        })
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Turn a mapped relative path back into an absolute one under the root.
    fn destination(&self, operator: &str, relative: &str) -> Result<String> {
        let absolute = path::join_paths(&self.root, &[relative])?;
        match path::relative_to(&self.root, &absolute) {
            Some(inside) if !inside.is_empty() => Ok(absolute),
            _ => Err(Error::Operator {
                operator: operator.to_string(),
                message: format!("Target '{}' is outside {}", relative, self.root),
            }),
        }
    }
}

impl Repomod for DeclarativeRepomod {
    fn name(&self) -> &str {
        &self.name
    }

    fn include_patterns(&self) -> &[String] {
        &self.include
    }

    fn exclude_patterns(&self) -> &[String] {
        &self.exclude
    }

    fn handle_directory(
        &self,
        api: &mut DirectoryApi<'_>,
        path: &str,
        options: &Options,
    ) -> Result<Vec<Command>> {
        if self.include.is_empty() {
            walk_directory(api, path, options)
        } else {
            Ok(Vec::new())
        }
    }

    fn handle_file(
        &self,
        _api: &FileApi<'_>,
        path: &str,
        options: &Options,
    ) -> Result<Vec<Command>> {
        let Some(relative) = path::relative_to(&self.root, path) else {
            return Ok(vec![Command::upsert_file(path, options.clone())]);
        };

        let mut renamed_to = None;
        let mut copies = Vec::new();

        for rule in &self.rules {
            match rule {
                Rule::Delete(patterns) if renamed_to.is_none() => {
                    if any_match(patterns, &relative) {
                        debug!("{}: deleting {}", self.name, relative);
                        return Ok(vec![Command::delete_file(path)]);
                    }
                }
                Rule::Rename(mappings) if renamed_to.is_none() => {
                    renamed_to = mappings
                        .iter()
                        .find_map(|m| m.apply(&relative))
                        .filter(|target| path::canonicalize(target) != relative);
                }
                Rule::Copy(mappings) => {
                    copies.extend(mappings.iter().filter_map(|m| m.apply(&relative)));
                }
                _ => {}
            }
        }

        let mut commands = Vec::new();
        for target in copies {
            let destination = self.destination("copy", &target)?;
            debug!("{}: copying {} to {}", self.name, path, destination);
            commands.push(Command::copy_file(path, destination.as_str(), options.clone()));
            commands.push(Command::upsert_file(destination, options.clone()));
        }

        match renamed_to {
            Some(target) => {
                let destination = self.destination("rename", &target)?;
                debug!("{}: moving {} to {}", self.name, path, destination);
                commands.push(Command::move_file(path, destination.as_str(), options.clone()));
                commands.push(Command::upsert_file(destination, options.clone()));
            }
            None => commands.push(Command::upsert_file(path, options.clone())),
        }

        Ok(commands)
    }

    fn handle_data(
        &self,
        _api: &DataApi,
        path: &str,
        data: &str,
        _options: &Options,
    ) -> Result<Command> {
        let Some(relative) = path::relative_to(&self.root, path) else {
            return Ok(Command::Noop);
        };

        let mut content = data.to_string();
        for rule in &self.rules {
            if let Rule::Replace {
                patterns,
                find,
                with,
            } = rule
            {
                if any_match(patterns, &relative) {
                    content = find.replace_all(&content, with.as_str()).into_owned();
                }
            }
        }

        if content == data {
            Ok(Command::Noop)
        } else {
            Ok(Command::upsert_data(path, content))
        }
    }
}
