//! 相对路径解析
//!
//! 从文件加载时，输入文件和 file 发送端的 `path` 参数按配置文件所在目录解析，
//! 与启动时的工作目录无关。绝对路径保持不变。

use std::path::Path;

use contracts::{NotifyBlueprint, TransportType};

/// 将 blueprint 中的相对路径改写为相对 `base` 的路径
pub fn resolve_relative_paths(blueprint: &mut NotifyBlueprint, base: &Path) {
    if base.as_os_str().is_empty() {
        return;
    }

    rebase(&mut blueprint.input.path, base);

    for channel in [&mut blueprint.channels.email, &mut blueprint.channels.sms] {
        if channel.transport.transport_type != TransportType::File {
            continue;
        }
        if let Some(path) = channel.transport.params.get_mut("path") {
            rebase(path, base);
        }
    }
}

fn rebase(path: &mut String, base: &Path) {
    if path.is_empty() || Path::new(path.as_str()).is_absolute() {
        return;
    }
    *path = base.join(path.as_str()).to_string_lossy().into_owned();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConfigFormat, ConfigLoader};

    const CONFIG: &str = r#"
[input]
path = "in/data.txt"

[message]
text = "hi"

[channels.email]
transport = { transport_type = "file", params = { path = "out/emails.txt" } }

[channels.sms]
transport = { transport_type = "log", params = { path = "not/a/file" } }
"#;

    #[test]
    fn test_rebases_input_and_file_transport() {
        let mut bp = ConfigLoader::load_from_str(CONFIG, ConfigFormat::Toml).unwrap();
        resolve_relative_paths(&mut bp, Path::new("/etc/notifier"));

        assert_eq!(Path::new(&bp.input.path), Path::new("/etc/notifier/in/data.txt"));
        assert_eq!(
            Path::new(&bp.channels.email.transport.params["path"]),
            Path::new("/etc/notifier/out/emails.txt")
        );
        // log 发送端的参数不是路径
        assert_eq!(bp.channels.sms.transport.params["path"], "not/a/file");
    }

    #[test]
    fn test_absolute_paths_untouched() {
        let mut bp = ConfigLoader::load_from_str(CONFIG, ConfigFormat::Toml).unwrap();
        bp.input.path = "/srv/data.txt".to_string();
        resolve_relative_paths(&mut bp, Path::new("/etc/notifier"));
        assert_eq!(bp.input.path, "/srv/data.txt");
    }

    #[test]
    fn test_empty_base_is_noop() {
        let mut bp = ConfigLoader::load_from_str(CONFIG, ConfigFormat::Toml).unwrap();
        resolve_relative_paths(&mut bp, Path::new(""));
        assert_eq!(bp.input.path, "in/data.txt");
    }
}
