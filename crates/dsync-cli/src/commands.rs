use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use colored::Colorize;
use dsync_figma::FigmaClient;
use dsync_server::{DsyncServer, ServerConfig};
use dsync_sync::files::{load_sources, load_tree, write_json, write_tree};
use dsync_sync::{merge_sources, PullOptions, PushOptions, SyncEngine};
use dsync_types::TokenTree;
use dsync_validate::Validator;
use serde::Serialize;
use serde_json::json;

use crate::build_tool::StyleDictionary;
use crate::cli::*;
use crate::config::{DsyncConfig, ENV_FILE_ID, ENV_TOKEN};
use crate::report::{warn_skipped, Reported, EXIT_FAILURE, EXIT_INVALID};

/// Settings shared by every command.
struct Ctx {
    format: OutputFormat,
    verbose: bool,
    config: PathBuf,
}

impl Ctx {
    fn json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    fn settings(&self) -> anyhow::Result<DsyncConfig> {
        DsyncConfig::resolve(&self.config)
    }
}

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let ctx = Ctx {
        format: cli.format,
        verbose: cli.verbose,
        config: cli.config,
    };
    match cli.command {
        Command::Init(args) => cmd_init(&ctx, args),
        Command::Pull(args) => cmd_pull(&ctx, args).await,
        Command::Push(args) => cmd_push(&ctx, args).await,
        Command::Validate(args) => cmd_validate(&ctx, args),
        Command::Merge(args) => cmd_merge(&ctx, args),
        Command::Transform(args) => cmd_transform(&ctx, args),
        Command::Diff(args) => cmd_diff(&ctx, args),
        Command::Build(args) => cmd_build(&ctx, args).await,
        Command::Serve(args) => cmd_serve(&ctx, args).await,
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn category_counts(tree: &TokenTree) -> Vec<(String, usize)> {
    tree.categories()
        .map(|(name, tokens)| (name.to_string(), tokens.len()))
        .collect()
}

fn print_summary(tree: &TokenTree) {
    let counts = category_counts(tree);
    let width = counts.iter().map(|(name, _)| name.len()).max().unwrap_or(0).max(8);
    println!("  {}  {}", format!("{:<width$}", "Category").bold(), "Tokens".bold());
    for (name, count) in counts {
        println!("  {}  {count}", format!("{name:<width$}").cyan());
    }
}

fn engine_for(settings: &DsyncConfig, file_id: String) -> anyhow::Result<SyncEngine> {
    let client = match FigmaClient::new(settings.figma.clone()) {
        Err(dsync_figma::FigmaError::MissingToken) => anyhow::bail!(
            "{ENV_TOKEN} not provided. Set it in .env or the environment."
        ),
        other => other?,
    };
    Ok(SyncEngine::new(Arc::new(client), file_id))
}

fn sample_tokens() -> [(&'static str, serde_json::Value); 2] {
    [
        (
            "colors.json",
            json!({
                "colors": {
                    "primary": {"value": "#1E40AF", "type": "color", "description": "Primary brand color"},
                    "secondary": {"value": "#7C3AED", "type": "color", "description": "Secondary brand color"},
                    "neutral100": {"value": "#F3F4F6", "type": "color"},
                    "neutral900": {"value": "#111827", "type": "color"}
                }
            }),
        ),
        (
            "spacing.json",
            json!({
                "spacing": {
                    "xs": {"value": "4px", "type": "dimension"},
                    "sm": {"value": "8px", "type": "dimension"},
                    "md": {"value": "16px", "type": "dimension"},
                    "lg": {"value": "24px", "type": "dimension"},
                    "xl": {"value": "32px", "type": "dimension"}
                }
            }),
        ),
    ]
}

fn sample_sd_config(tokens_out: &Path) -> serde_json::Value {
    json!({
        "source": [tokens_out],
        "platforms": {
            "css": {
                "transformGroup": "css",
                "buildPath": "build/css/",
                "files": [{"destination": "variables.css", "format": "css/variables"}]
            },
            "ios": {
                "transformGroup": "ios-swift",
                "buildPath": "build/ios/",
                "files": [{"destination": "Tokens.swift", "format": "ios-swift/class.swift", "className": "Tokens"}]
            },
            "android": {
                "transformGroup": "android",
                "buildPath": "build/android/",
                "files": [{"destination": "tokens.xml", "format": "android/resources"}]
            }
        }
    })
}

fn cmd_init(ctx: &Ctx, args: InitArgs) -> anyhow::Result<()> {
    let dir = args.dir;
    let env_path = dir.join(".env");
    if env_path.exists() && !args.force {
        anyhow::bail!(
            "{} already exists; use --force to overwrite",
            env_path.display()
        );
    }
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut created = Vec::new();
    let env = format!(
        "{ENV_TOKEN}={}\n{ENV_FILE_ID}={}\n",
        args.token.unwrap_or_default(),
        args.file_id.unwrap_or_default()
    );
    std::fs::write(&env_path, env).with_context(|| format!("writing {}", env_path.display()))?;
    created.push(env_path);

    let settings = DsyncConfig::default();
    let config_path = dir.join("dsync.toml");
    if args.force || !config_path.exists() {
        std::fs::write(&config_path, settings.to_toml()?)
            .with_context(|| format!("writing {}", config_path.display()))?;
        created.push(config_path);
    }

    let sd_path = dir.join(&settings.build.sd_config);
    if args.force || !sd_path.exists() {
        write_json(&sd_path, &sample_sd_config(&settings.build.tokens_out), true)?;
        created.push(sd_path);
    }

    for (name, value) in sample_tokens() {
        let path = dir.join("tokens").join(name);
        if !args.force && path.exists() {
            continue;
        }
        write_tree(&path, &TokenTree::from_json_value(value)?, true)?;
        created.push(path);
    }

    if ctx.json() {
        return print_json(&json!({ "created": created }));
    }
    println!("{} Initialization complete!", "✓".green().bold());
    for path in &created {
        println!("  created {}", path.display());
    }
    println!("\nNext steps:");
    println!("  1. Run {} to fetch tokens from Figma", "dsync pull".cyan());
    println!("  2. Edit tokens in the tokens/ directory");
    println!("  3. Run {} to sync back to Figma", "dsync push".cyan());
    Ok(())
}

async fn cmd_pull(ctx: &Ctx, args: PullArgs) -> anyhow::Result<()> {
    let settings = ctx.settings()?;
    let file_id = settings.file_id(args.file_id.as_deref())?;
    let engine = engine_for(&settings, file_id.clone())?;
    if !ctx.json() {
        println!("{}", format!("Pulling tokens from Figma file: {file_id}").cyan());
    }

    let report = engine
        .pull(&PullOptions {
            strict: args.strict,
            mode: args.mode,
        })
        .await?;
    write_tree(&args.output, &report.tree, !args.compact)?;

    if ctx.json() {
        return print_json(&json!({
            "output": args.output,
            "tokens": report.tree.token_count(),
            "categories": category_counts(&report.tree)
                .into_iter()
                .map(|(name, count)| (name, json!(count)))
                .collect::<serde_json::Map<_, _>>(),
            "transform_failures": report.transform_failures,
            "validation": report.validation,
        }));
    }
    warn_skipped(report.transform_failures.iter());
    for failure in report.validation.failures() {
        eprintln!("{} {failure}", "invalid:".yellow());
    }
    println!(
        "\n{} Pulled {} token(s) to {}",
        "✓".green().bold(),
        report.tree.token_count(),
        args.output.display()
    );
    print_summary(&report.tree);
    Ok(())
}

async fn cmd_push(ctx: &Ctx, args: PushArgs) -> anyhow::Result<()> {
    let settings = ctx.settings()?;
    let file_id = settings.file_id(args.file_id.as_deref())?;

    let trees: Vec<TokenTree> = load_sources(&args.inputs)?
        .into_iter()
        .map(|(_, tree)| tree)
        .collect();
    let local = merge_sources(&trees, &Validator::default())?.tree;

    let engine = engine_for(&settings, file_id.clone())?;
    if !ctx.json() {
        println!("{}", format!("Pushing tokens to Figma file: {file_id}").cyan());
    }
    let report = engine
        .push(
            &local,
            &PushOptions {
                dry_run: args.dry_run,
                merge_remote: !args.no_merge,
                strict: args.strict,
            },
        )
        .await?;

    if ctx.json() {
        return print_json(&report);
    }
    warn_skipped(report.transform_failures.iter());
    if report.dry_run {
        println!("\n{}", "DRY RUN - no changes will be made".yellow());
        print_diff(&dsync_diff::render_text(&report.diff));
        return Ok(());
    }
    if report.is_noop() {
        println!("{} Figma is already up to date", "✓".green().bold());
    } else {
        println!(
            "{} Pushed {} change(s) to Figma",
            "✓".green().bold(),
            report.applied
        );
        if ctx.verbose {
            print_diff(&dsync_diff::render_text(&report.diff));
        }
    }
    Ok(())
}

fn cmd_validate(ctx: &Ctx, args: ValidateArgs) -> anyhow::Result<()> {
    let validator = if args.allow.is_empty() {
        Validator::default()
    } else {
        Validator::with_allowed_kinds(args.allow)
    };
    let sources = load_sources(&args.inputs)?;

    let mut results = Vec::new();
    let mut invalid = 0;
    for (path, tree) in &sources {
        let report = validator.validate(tree);
        if !report.is_valid() {
            invalid += 1;
        }
        if !ctx.json() {
            if report.is_valid() {
                println!("{} {} is valid", "✓".green().bold(), path.display());
                print_summary(tree);
            } else {
                println!("{} {}", "Validation errors found in".red(), path.display());
                for failure in report.failures() {
                    println!("  - {failure}");
                }
            }
        }
        results.push(json!({
            "path": path,
            "valid": report.is_valid(),
            "tokens": tree.token_count(),
            "failures": report.failures(),
        }));
    }

    if ctx.json() {
        print_json(&results)?;
    }
    if invalid > 0 {
        return Err(Reported::new(
            EXIT_INVALID,
            format!("{invalid} of {} file(s) invalid", sources.len()),
        )
        .into());
    }
    Ok(())
}

fn cmd_merge(ctx: &Ctx, args: MergeArgs) -> anyhow::Result<()> {
    let trees: Vec<TokenTree> = load_sources(&args.inputs)?
        .into_iter()
        .map(|(_, tree)| tree)
        .collect();
    let report = merge_sources(&trees, &Validator::default())?;
    write_tree(&args.output, &report.tree, !args.compact)?;

    if ctx.json() {
        return print_json(&json!({
            "output": args.output,
            "sources": report.sources,
            "tokens": report.tree.token_count(),
            "overridden": report.overridden,
        }));
    }
    println!(
        "{} Merged {} source(s) into {} ({} tokens)",
        "✓".green().bold(),
        report.sources,
        args.output.display(),
        report.tree.token_count()
    );
    for path in &report.overridden {
        println!("  {} {path}", "overridden:".dimmed());
    }
    Ok(())
}

fn cmd_transform(ctx: &Ctx, args: TransformArgs) -> anyhow::Result<()> {
    if args.from_build {
        let text = std::fs::read_to_string(&args.input)
            .with_context(|| format!("reading {}", args.input.display()))?;
        let transformed = dsync_sync::transform_from_build(&text, args.strict)?;
        warn_skipped(transformed.failures.iter());
        match &args.output {
            Some(path) => write_tree(path, &transformed.output, true)?,
            None => println!("{}", transformed.output.to_json_string(true)?),
        }
    } else {
        let tree = load_tree(&args.input)?;
        let transformed =
            dsync_sync::transform_to_build(&tree, args.platform, args.strict, &Validator::default())?;
        warn_skipped(transformed.failures.iter());
        match &args.output {
            Some(path) => write_json(path, &transformed.output, true)?,
            None => println!("{}", serde_json::to_string_pretty(&transformed.output)?),
        }
    }

    if let Some(path) = &args.output {
        if !ctx.json() {
            println!("{} Wrote {}", "✓".green().bold(), path.display());
        }
    }
    Ok(())
}

fn print_diff(rendered: &str) {
    for line in rendered.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('+') {
            println!("{}", line.green());
        } else if trimmed.starts_with('-') {
            println!("{}", line.red());
        } else if trimmed.starts_with('~') {
            println!("{}", line.yellow());
        } else {
            println!("{line}");
        }
    }
}

fn cmd_diff(ctx: &Ctx, args: DiffArgs) -> anyhow::Result<()> {
    let base = load_tree(&args.base)?;
    let proposed = load_tree(&args.proposed)?;
    let diff = dsync_diff::diff(&base, &proposed);
    if ctx.json() {
        return print_json(&diff);
    }
    print_diff(&dsync_diff::render_text(&diff));
    Ok(())
}

async fn cmd_build(ctx: &Ctx, args: BuildArgs) -> anyhow::Result<()> {
    let settings = ctx.settings()?;
    let mut tool = StyleDictionary::new(&settings.build);
    if let Some(path) = args.sd_config {
        tool = tool.with_sd_config(path);
    }
    let problems = tool.check_config();
    if !problems.is_empty() {
        if !ctx.json() {
            for problem in &problems {
                eprintln!("  - {problem}");
            }
        }
        return Err(Reported::new(
            EXIT_FAILURE,
            format!("invalid build configuration {}", tool.sd_config().display()),
        )
        .into());
    }

    let platforms = if args.platform.is_empty() {
        settings.build.platforms.clone()
    } else {
        args.platform
    };
    let trees: Vec<TokenTree> = load_sources(&args.inputs)?
        .into_iter()
        .map(|(_, tree)| tree)
        .collect();
    let validator = Validator::default();
    let merged = merge_sources(&trees, &validator)?;
    let outcomes = dsync_sync::build(&merged.tree, &platforms, &tool, &validator).await?;

    if ctx.json() {
        return print_json(&json!({
            "platforms": platforms,
            "tokens": merged.tree.token_count(),
            "tokens_out": settings.build.tokens_out,
        }));
    }
    for outcome in outcomes {
        let platform = outcome.platform.map_or("all", |p| p.as_str());
        println!("{} Built {}", "✓".green().bold(), platform.yellow());
        if ctx.verbose && !outcome.log.trim().is_empty() {
            println!("{}", outcome.log.trim_end().dimmed());
        }
    }
    Ok(())
}

async fn cmd_serve(ctx: &Ctx, args: ServeArgs) -> anyhow::Result<()> {
    let settings = ctx.settings()?;
    let mut config = ServerConfig {
        file_id: settings.file_id,
        figma: settings.figma,
        permissive_cors: args.cors,
        ..ServerConfig::default()
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind
            .parse()
            .with_context(|| format!("invalid bind address '{bind}'"))?;
    }
    if !ctx.json() {
        println!("dsync bridge on {}", config.bind_addr.to_string().bold());
    }
    DsyncServer::with_figma(config)?.serve().await?;
    Ok(())
}
