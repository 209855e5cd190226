//! Managed units and the process manager config rendered from them.

use std::path::Path;

use minijinja::{context, Environment};
use serde::Serialize;

use crate::defaults;
use crate::error::{Error, Result};

const CONFIG_TEMPLATE: &str = r#"[supervisord]
nodaemon=true
logfile=/dev/null
logfile_maxbytes=0
pidfile=/tmp/supervisord.pid
{% for unit in units %}
[program:{{ unit.name }}]
command={{ unit.command_line }}
priority={{ unit.priority }}
autostart=true
autorestart=true
startretries=3
stopsignal=TERM
stopwaitsecs=30
stopasgroup=true
killasgroup=true
stdout_logfile=/dev/stdout
stdout_logfile_maxbytes=0
stderr_logfile=/dev/stderr
stderr_logfile_maxbytes=0
{% endfor %}"#;

/// One unit the process manager runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceDescriptor {
    pub name: String,
    pub command: Vec<String>,
    /// Lower starts first.
    pub start_order: i32,
}

impl ServiceDescriptor {
    pub fn new(name: impl Into<String>, command: Vec<String>, start_order: i32) -> Self {
        Self {
            name: name.into(),
            command,
            start_order,
        }
    }
}

#[derive(Serialize)]
struct UnitView<'a> {
    name: &'a str,
    command_line: String,
    priority: i32,
}

/// The static unit list: the model server, plus an optional application.
pub fn default_units(warden_exe: &Path, app_command: Option<&str>) -> Vec<ServiceDescriptor> {
    let mut units = vec![ServiceDescriptor::new(
        defaults::MODEL_SERVER_UNIT,
        vec![warden_exe.to_string_lossy().into_owned(), "serve".to_string()],
        defaults::MODEL_SERVER_ORDER,
    )];

    if let Some(app) = app_command.map(str::trim).filter(|c| !c.is_empty()) {
        units.push(ServiceDescriptor::new(
            defaults::APP_UNIT,
            vec!["/bin/sh".to_string(), "-c".to_string(), app.to_string()],
            defaults::APP_ORDER,
        ));
    }

    units
}

/// Render the process manager config, units ordered by `start_order`.
pub fn render_config(units: &[ServiceDescriptor]) -> Result<String> {
    let mut ordered: Vec<&ServiceDescriptor> = units.iter().collect();
    ordered.sort_by_key(|u| u.start_order);

    let views = ordered
        .into_iter()
        .map(|u| {
            Ok(UnitView {
                name: &u.name,
                command_line: command_line(&u.command)?,
                priority: u.start_order,
            })
        })
        .collect::<Result<Vec<UnitView<'_>>>>()?;

    let mut env = Environment::new();
    env.add_template("supervisord.conf", CONFIG_TEMPLATE)?;
    let rendered = env
        .get_template("supervisord.conf")?
        .render(context! { units => views })?;

    Ok(rendered)
}

/// Join arguments so the process manager splits them back the same way.
/// `%` is doubled because the config format interpolates it. Line breaks
/// cannot be represented in a single config line and are rejected.
fn command_line(args: &[String]) -> Result<String> {
    let mut parts = Vec::with_capacity(args.len());
    for arg in args {
        if arg.contains(['\n', '\r']) {
            return Err(Error::Config(format!(
                "Command argument {:?} contains a line break",
                arg
            )));
        }

        let plain = !arg.is_empty()
            && arg
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@".contains(c));
        let quoted = if plain {
            arg.clone()
        } else {
            format!("\"{}\"", arg.replace('\\', "\\\\").replace('"', "\\\""))
        };
        parts.push(quoted.replace('%', "%%"));
    }
    Ok(parts.join(" "))
}
