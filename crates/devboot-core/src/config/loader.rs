//! 统一环境变量加载逻辑
//!
//! 集中维护 fallback 链，避免在业务代码中重复 `or_else` 调用。

use std::env;
use std::path::Path;

/// 解析 `.env` 内容为 key/value 列表（保持文件顺序）
///
/// Supports `#` comments, `export KEY=...`, single/double quotes and trailing
/// inline comments outside quotes.
pub fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some(eq_pos) = line.find('=') else {
            continue;
        };
        let key = line[..eq_pos].trim();
        let mut value = line[eq_pos + 1..].trim();
        // Strip inline comment (# not inside quotes)
        if let Some(hash_pos) = value.find('#') {
            let before_hash = value[..hash_pos].trim_end();
            if !before_hash.contains('"') && !before_hash.contains('\'') {
                value = before_hash;
            }
        }
        if value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')))
        {
            value = &value[1..value.len() - 1];
        }
        if !key.is_empty() {
            pairs.push((key.to_string(), value.to_string()));
        }
    }
    pairs
}

/// 加载当前目录下的 `.env` 到环境变量（不覆盖已存在的变量）
pub fn load_dotenv() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let dir = env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from("."));
        load_dotenv_from_dir(&dir);
    });
}

/// 从指定目录加载 `.env`，返回实际写入的变量个数
pub fn load_dotenv_from_dir(dir: &Path) -> usize {
    let path = dir.join(".env");
    let pending = pending_dotenv(dir, |key| env::var_os(key).is_some());
    for (key, value) in &pending {
        set_env_var(key, value);
    }
    tracing::debug!(path = %path.display(), applied = pending.len(), "loaded .env");
    pending.len()
}

/// `dir/.env` 中尚未设置（`is_set` 返回 false）的条目；文件缺失时为空
pub fn pending_dotenv(dir: &Path, is_set: impl Fn(&str) -> bool) -> Vec<(String, String)> {
    let Ok(content) = std::fs::read_to_string(dir.join(".env")) else {
        return Vec::new();
    };
    parse_dotenv(&content)
        .into_iter()
        .filter(|(key, _)| !is_set(key))
        .collect()
}

fn process_env(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn lookup_chain(
    lookup: impl Fn(&str) -> Option<String>,
    primary: &str,
    aliases: &[&str],
) -> Option<String> {
    lookup(primary).or_else(|| aliases.iter().find_map(|a| lookup(*a)))
}

/// 从主变量或别名链读取环境变量，失败时使用默认值
pub fn env_or<F>(primary: &str, aliases: &[&str], default: F) -> String
where
    F: FnOnce() -> String,
{
    env_or_with(process_env, primary, aliases, default)
}

/// [`env_or`] over an arbitrary variable source.
pub fn env_or_with<F>(
    lookup: impl Fn(&str) -> Option<String>,
    primary: &str,
    aliases: &[&str],
    default: F,
) -> String
where
    F: FnOnce() -> String,
{
    lookup_chain(lookup, primary, aliases)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(default)
}

/// 从主变量或别名链读取，返回 Option（空值视为未设置）
pub fn env_optional(primary: &str, aliases: &[&str]) -> Option<String> {
    env_optional_with(process_env, primary, aliases)
}

pub fn env_optional_with(
    lookup: impl Fn(&str) -> Option<String>,
    primary: &str,
    aliases: &[&str],
) -> Option<String> {
    lookup_chain(lookup, primary, aliases).and_then(|s| {
        let s = s.trim().to_string();
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    })
}

/// 解析布尔型环境变量：0/false/no/off 为 false，其余非空值为 true
pub fn env_bool(primary: &str, aliases: &[&str], default: bool) -> bool {
    env_bool_with(process_env, primary, aliases, default)
}

pub fn env_bool_with(
    lookup: impl Fn(&str) -> Option<String>,
    primary: &str,
    aliases: &[&str],
    default: bool,
) -> bool {
    match lookup_chain(lookup, primary, aliases).as_deref() {
        Some(s) => !matches!(
            s.trim().to_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        ),
        None => default,
    }
}

// SAFETY 约定：只在 main 启动阶段（派生任何线程之前）调用。
/// 设置单个环境变量（进程级写入集中在此处）
pub fn set_env_var(key: &str, value: &str) {
    env::set_var(key, value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_dotenv_quotes_and_comments() {
        let content = r#"
# comment
API_BASE="http://127.0.0.1:9000"
export DEVBOOT_PROFILE=app   # trailing
SINGLE='a b'
HASH_IN_QUOTES="x#y"
NOEQUALS
=orphan
"#;
        let pairs = parse_dotenv(content);
        assert_eq!(
            pairs,
            vec![
                ("API_BASE".to_string(), "http://127.0.0.1:9000".to_string()),
                ("DEVBOOT_PROFILE".to_string(), "app".to_string()),
                ("SINGLE".to_string(), "a b".to_string()),
                ("HASH_IN_QUOTES".to_string(), "x#y".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_dotenv_empty_value() {
        let pairs = parse_dotenv("EMPTY=\nQUOTE=\"\n");
        assert_eq!(pairs[0], ("EMPTY".to_string(), String::new()));
        // A lone quote is kept verbatim.
        assert_eq!(pairs[1], ("QUOTE".to_string(), "\"".to_string()));
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_pending_dotenv_skips_already_set() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join(".env"),
            "DEVBOOT_PROFILE=app\nAPI_BASE=http://127.0.0.1:9000\n",
        )
        .unwrap();
        let pending = pending_dotenv(tmp.path(), |key| key == "DEVBOOT_PROFILE");
        assert_eq!(
            pending,
            vec![("API_BASE".to_string(), "http://127.0.0.1:9000".to_string())]
        );
    }

    #[test]
    fn test_pending_dotenv_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(pending_dotenv(tmp.path(), |_| false).is_empty());
    }

    #[test]
    fn test_env_fallbacks() {
        let lookup = vars(&[("ALIAS_ONLY", "aliased"), ("BLANK", "  "), ("EMPTY", "")]);
        assert_eq!(
            env_or_with(&lookup, "PRIMARY", &["ALIAS_ONLY"], String::new),
            "aliased"
        );
        assert_eq!(
            env_or_with(&lookup, "PRIMARY", &[], || "dflt".to_string()),
            "dflt"
        );
        assert_eq!(
            env_or_with(&lookup, "EMPTY", &[], || "dflt".to_string()),
            "dflt"
        );
        assert_eq!(env_optional_with(&lookup, "BLANK", &[]), None);
        assert_eq!(
            env_optional_with(&lookup, "PRIMARY", &["ALIAS_ONLY"]).as_deref(),
            Some("aliased")
        );
    }

    #[test]
    fn test_env_bool() {
        let lookup = vars(&[("OFF", "off"), ("ON", "1"), ("NO", " No ")]);
        assert!(!env_bool_with(&lookup, "OFF", &[], true));
        assert!(!env_bool_with(&lookup, "NO", &[], true));
        assert!(env_bool_with(&lookup, "ON", &[], false));
        assert!(env_bool_with(&lookup, "UNSET", &[], true));
        assert!(!env_bool_with(&lookup, "UNSET", &[], false));
    }
}
