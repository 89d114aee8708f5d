use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use serde::Serialize;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use article_filter::{ArticleFilter, MemoryStore, SearchConfig, SearchParams, SNAPSHOT_FILE};
use utils_common::ArticleId;

mod export;

fn index_arg() -> Arg {
    Arg::new("index")
        .short('i')
        .long("index")
        .value_name("SNAPSHOT")
        .help("快照文件，或包含 articles.bin 的目录")
        .value_parser(value_parser!(PathBuf))
        .required(true)
}

fn id_arg() -> Arg {
    Arg::new("id")
        .value_name("ARTICLE_ID")
        .help("文章ID")
        .value_parser(value_parser!(ArticleId))
        .required(true)
}

fn cli() -> Command {
    Command::new("文章检索工具")
        .version(env!("CARGO_PKG_VERSION"))
        .about("生成文章检索快照，并在快照上执行搜索和推荐")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("CONFIG_FILE")
                .help("JSON配置文件，缺省时使用默认配置")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("显示详细信息")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("build")
                .about("从导出目录生成检索快照")
                .arg(
                    Arg::new("source")
                        .short('s')
                        .long("source")
                        .value_name("SOURCE_DIR")
                        .help("导出目录，包含 categories.json、tags.json 和文章JSON文件")
                        .value_parser(value_parser!(PathBuf))
                        .required(true),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("OUTPUT_DIR")
                        .help("快照输出目录")
                        .value_parser(value_parser!(PathBuf))
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("search")
                .about("按搜索词、分类、标签搜索文章")
                .arg(index_arg())
                .arg(
                    Arg::new("term")
                        .short('t')
                        .long("term")
                        .value_name("TERM")
                        .help("搜索词")
                        .default_value(""),
                )
                .arg(
                    Arg::new("category")
                        .long("category")
                        .value_name("CATEGORY_ID")
                        .help("分类ID，0表示不筛选")
                        .value_parser(value_parser!(i64))
                        .default_value("0"),
                )
                .arg(
                    Arg::new("tag")
                        .long("tag")
                        .value_name("TAG_ID")
                        .help("标签ID，可重复")
                        .value_parser(value_parser!(i64))
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("page")
                        .short('p')
                        .long("page")
                        .value_name("PAGE")
                        .help("页码，从1开始")
                        .allow_hyphen_values(true)
                        .default_value("1"),
                ),
        )
        .subcommand(
            Command::new("similar")
                .about("列出与指定文章相似的文章")
                .arg(index_arg())
                .arg(id_arg()),
        )
        .subcommand(Command::new("sidebar").about("输出侧栏数据").arg(index_arg()))
        .subcommand(
            Command::new("show")
                .about("输出文章详情及上一篇、下一篇")
                .arg(index_arg())
                .arg(id_arg()),
        )
}

fn main() -> Result<()> {
    let matches = cli().get_matches();

    let filter = if matches.get_flag("verbose") {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => {
            SearchConfig::from_json_file(path).with_context(|| format!("加载配置失败: {}", path.display()))?
        }
        None => SearchConfig::default(),
    };

    match matches.subcommand() {
        Some(("build", sub)) => build(sub),
        Some(("search", sub)) => {
            let filter = open_filter(sub, config)?;
            let tags: Vec<i64> = sub.get_many::<i64>("tag").unwrap_or_default().copied().collect();
            let params: SearchParams = serde_json::from_value(json!({
                "term": sub.get_one::<String>("term").map(String::as_str).unwrap_or_default(),
                "category": sub.get_one::<i64>("category").copied().unwrap_or_default(),
                "tags": tags,
                "page": sub.get_one::<String>("page").map(String::as_str).unwrap_or("1"),
            }))?;
            print_json(&filter.respond(params)?)
        }
        Some(("similar", sub)) => {
            let filter = open_filter(sub, config)?;
            print_json(&filter.ranked_similar(article_id(sub)?)?)
        }
        Some(("sidebar", sub)) => {
            let filter = open_filter(sub, config)?;
            print_json(&filter.side_panel()?)
        }
        Some(("show", sub)) => {
            let filter = open_filter(sub, config)?;
            print_json(&filter.article_detail(article_id(sub)?)?)
        }
        _ => bail!("未知的子命令"),
    }
}

fn build(matches: &ArgMatches) -> Result<()> {
    let start_time = Instant::now();
    let source = matches
        .get_one::<PathBuf>("source")
        .context("缺少源目录")?;
    let output = matches
        .get_one::<PathBuf>("output")
        .context("缺少输出目录")?;

    if !source.is_dir() {
        bail!("源目录不存在或不是有效目录 '{}'", source.display());
    }
    fs::create_dir_all(output).with_context(|| format!("无法创建输出目录 '{}'", output.display()))?;

    let (builder, skipped) = export::load_source_dir(source)?;
    if builder.article_count() == 0 {
        bail!("没有找到有效文章");
    }

    let snapshot_path = output.join(SNAPSHOT_FILE);
    let snapshot = builder.save(&snapshot_path)?;

    info!(
        path = %snapshot_path.display(),
        skipped,
        elapsed_secs = start_time.elapsed().as_secs_f32(),
        "快照生成完成"
    );
    print_json(&snapshot.metadata)
}

fn open_filter(matches: &ArgMatches, config: SearchConfig) -> Result<ArticleFilter<MemoryStore>> {
    let index = matches.get_one::<PathBuf>("index").context("缺少快照路径")?;
    let store = MemoryStore::open(&snapshot_path(index))?;
    Ok(ArticleFilter::new(store, config)?)
}

fn snapshot_path(index: &Path) -> PathBuf {
    if index.is_dir() {
        index.join(SNAPSHOT_FILE)
    } else {
        index.to_path_buf()
    }
}

fn article_id(matches: &ArgMatches) -> Result<ArticleId> {
    matches.get_one::<ArticleId>("id").copied().context("缺少文章ID")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
