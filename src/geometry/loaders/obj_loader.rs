//! OBJ 文件加载器
//!
//! 逐行读取三角化后的 Wavefront OBJ 文件，只解析 `v`（顶点位置）和 `f`（面）两种行，
//! 其他行（注释、`o`、`usemtl`、`s`、`mtllib`、`vn`、`vt`、空行）全部忽略。
//!
//! 行按单个空格切分，连续空格会产生空 token（不合并），见 [`split_tokens`]。
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::MeshLoader;
use crate::core::config::LoaderConfig;
use crate::core::error::{MeshLoadError, Result};
use crate::geometry::mesh::{Face, Mesh, Point};

/// 行内 token 分隔符
pub const TOKEN_DELIMITER: char = ' ';

/// 数值解析策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumberPolicy {
    /// 无法解析的 token 按 0.0 处理并计数
    #[default]
    Lenient,
    /// 遇到无法解析的 token 立即失败
    Strict,
}

/// 加载选项
#[derive(Debug, Clone, Default)]
pub struct LoaderOptions {
    pub number_policy: NumberPolicy,
    /// 加载完成后执行 [`Mesh::validate`]
    pub validate: bool,
}

impl LoaderOptions {
    pub fn from_config(config: &LoaderConfig) -> Self {
        Self {
            number_policy: if config.strict_numbers {
                NumberPolicy::Strict
            } else {
                NumberPolicy::Lenient
            },
            validate: config.validate_faces,
        }
    }
}

/// 一次加载的统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// 读取的行数
    pub lines: usize,
    /// `v` 行数
    pub points: usize,
    /// `f` 行数
    pub faces: usize,
    /// 被忽略的行数
    pub ignored_lines: usize,
    /// 宽松模式下被按 0 处理的 token 数
    pub coerced_tokens: usize,
}

/// token 无法解析为数值
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNumberError {
    pub token: String,
}

impl fmt::Display for ParseNumberError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' does not start with a number", self.token)
    }
}

impl std::error::Error for ParseNumberError {}

/// 按分隔符切分一行
///
/// 等价于在行尾追加一个分隔符，然后逐字符累积，每遇到分隔符就输出当前 token。
/// 因此连续分隔符产生空 token，空行产生 `[""]`。
///
/// ```rust
/// use flat_obj_viewer::geometry::loaders::obj_loader::split_tokens;
///
/// assert_eq!(split_tokens("f  2   3 4", ' '), ["f", "", "2", "", "", "3", "4"]);
/// assert_eq!(split_tokens("", ' '), [""]);
/// ```
pub fn split_tokens(line: &str, delimiter: char) -> Vec<&str> {
    line.split(delimiter).collect()
}

/// 解析 token 开头最长的合法十进制浮点数
///
/// 与流式提取一致：跳过前导空白，读取 `[+-]digits[.digits][(e|E)[+-]digits]`，
/// 其后的字符被忽略（`"2/5/7"` 得到 2.0）。没有任何数字，或者指数标记后
/// 没有数字（`"1e"`、`"1e+"`、`"1ex"`）时返回错误。
pub fn parse_leading_float(token: &str) -> std::result::Result<f32, ParseNumberError> {
    let text = token.trim_start();
    let bytes = text.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }

    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - (end + 1);
        end = frac_end;
    }

    if mantissa_digits == 0 {
        return Err(ParseNumberError {
            token: token.to_string(),
        });
    }

    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+') | Some(b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        // 指数标记后没有数字时整个 token 无法解析
        if exp_end == exp {
            return Err(ParseNumberError {
                token: token.to_string(),
            });
        }
        end = exp_end;
    }

    text[..end].parse::<f32>().map_err(|_| ParseNumberError {
        token: token.to_string(),
    })
}

/// OBJ 格式加载器
///
/// # 使用示例
///
/// ```rust,no_run
/// use flat_obj_viewer::geometry::loaders::{MeshLoader, ObjLoader};
/// use std::path::Path;
///
/// let mesh = ObjLoader::load_from_file(Path::new("data/cube.obj"))?;
/// println!("{} 个点, {} 个面", mesh.point_count(), mesh.face_count());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct ObjLoader;

impl ObjLoader {
    /// 使用指定选项从文件加载
    pub fn load_from_file_with(path: &Path, options: &LoaderOptions) -> Result<(Mesh, LoadReport)> {
        let file = File::open(path).map_err(|source| MeshLoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let name = path.file_stem().and_then(|s| s.to_str());
        tracing::debug!(path = %path.display(), "Loading OBJ file");

        // 文件句柄在函数返回时关闭
        Self::load_from_reader(BufReader::new(file), name, options)
    }

    /// 从任意 `BufRead` 读取 OBJ 数据
    ///
    /// 行尾的 `\n` 和 `\r\n` 会被去掉，其他位置的 `\r` 保留在 token 中；
    /// 非 UTF-8 字节按替换字符处理。
    pub fn load_from_reader<R: BufRead>(
        mut reader: R,
        name: Option<&str>,
        options: &LoaderOptions,
    ) -> Result<(Mesh, LoadReport)> {
        let mut mesh = match name {
            Some(name) => Mesh::with_name(name),
            None => Mesh::new(),
        };
        let mut report = LoadReport::default();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let line_no = report.lines + 1;
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|source| MeshLoadError::Read { line: line_no, source })?;
            if read == 0 {
                break;
            }
            report.lines = line_no;

            // 只去掉一个 `\n` 以及紧邻它的一个 `\r`
            if buf.last() == Some(&b'\n') {
                buf.pop();
                if buf.last() == Some(&b'\r') {
                    buf.pop();
                }
            }
            let line = String::from_utf8_lossy(&buf);

            Self::parse_line(&line, line_no, options, &mut mesh, &mut report)?;
        }

        if report.coerced_tokens > 0 {
            crate::viewer_warn!(
                count = report.coerced_tokens,
                "Unparsable numbers were replaced with 0"
            );
        }

        if options.validate {
            mesh.validate()?;
        }

        crate::viewer_info!(
            name = mesh.name.as_deref().unwrap_or("<memory>"),
            lines = report.lines,
            points = report.points,
            faces = report.faces,
            ignored = report.ignored_lines,
            "OBJ loaded"
        );

        Ok((mesh, report))
    }

    fn parse_line(
        line: &str,
        line_no: usize,
        options: &LoaderOptions,
        mesh: &mut Mesh,
        report: &mut LoadReport,
    ) -> Result<()> {
        let tokens = split_tokens(line, TOKEN_DELIMITER);

        match tokens[0] {
            "v" => {
                let coords = Self::parse_numbers(&tokens[1..], line_no, options, report)?;
                mesh.points.push(Point::from_coords(&coords));
                report.points += 1;
            }
            "f" => {
                // OBJ 索引从 1 开始；先按浮点解析再截断为整数
                let indices = Self::parse_numbers(&tokens[1..], line_no, options, report)?
                    .into_iter()
                    .map(|value| (value as i32).saturating_sub(1))
                    .collect();
                mesh.faces.push(Face::new(indices));
                report.faces += 1;
            }
            _ => report.ignored_lines += 1,
        }

        Ok(())
    }

    fn parse_numbers(
        tokens: &[&str],
        line_no: usize,
        options: &LoaderOptions,
        report: &mut LoadReport,
    ) -> Result<Vec<f32>> {
        tokens
            .iter()
            .map(|token| match parse_leading_float(token) {
                Ok(value) => Ok(value),
                Err(err) => match options.number_policy {
                    NumberPolicy::Lenient => {
                        tracing::debug!(line = line_no, token = %err.token, "Coercing token to 0");
                        report.coerced_tokens += 1;
                        Ok(0.0)
                    }
                    NumberPolicy::Strict => Err(MeshLoadError::Parse {
                        line: line_no,
                        token: err.token,
                    }
                    .into()),
                },
            })
            .collect()
    }
}

impl MeshLoader for ObjLoader {
    fn load_from_file(path: &Path) -> Result<Mesh> {
        Self::load_from_file_with(path, &LoaderOptions::default()).map(|(mesh, _)| mesh)
    }

    fn load_from_memory(data: &[u8]) -> Result<Mesh> {
        Self::load_from_reader(data, None, &LoaderOptions::default()).map(|(mesh, _)| mesh)
    }

    fn supported_extensions() -> &'static [&'static str] {
        &["obj"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn load(text: &str) -> (Mesh, LoadReport) {
        ObjLoader::load_from_reader(text.as_bytes(), None, &LoaderOptions::default()).unwrap()
    }

    #[test]
    fn test_supported_extensions() {
        assert_eq!(ObjLoader::supported_extensions(), &["obj"]);
    }

    #[test]
    fn test_split_irregular_spacing() {
        assert_eq!(
            split_tokens("f  2   3 4", ' '),
            vec!["f", "", "2", "", "", "3", "4"]
        );
        assert_eq!(split_tokens("v 1 2 3 ", ' '), vec!["v", "1", "2", "3", ""]);
        assert_eq!(split_tokens("", ' '), vec![""]);
    }

    #[test]
    fn test_parse_leading_float() {
        assert_eq!(parse_leading_float("1.0"), Ok(1.0));
        assert_eq!(parse_leading_float("-2.0"), Ok(-2.0));
        assert_eq!(parse_leading_float("3.5"), Ok(3.5));
        assert_eq!(parse_leading_float(".5"), Ok(0.5));
        assert_eq!(parse_leading_float("7."), Ok(7.0));
        assert_eq!(parse_leading_float("1e3"), Ok(1000.0));
        assert_eq!(parse_leading_float("2E-1x"), Ok(0.2));
        assert!(parse_leading_float("1e").is_err());
        assert!(parse_leading_float("1e+").is_err());
        assert!(parse_leading_float("1ex").is_err());
        assert_eq!(parse_leading_float("2/5/7"), Ok(2.0));
        assert_eq!(parse_leading_float("1.5abc"), Ok(1.5));
        assert!(parse_leading_float("").is_err());
        assert!(parse_leading_float("abc").is_err());
        assert!(parse_leading_float("-").is_err());
        assert!(parse_leading_float(".").is_err());
    }

    #[test]
    fn test_vertex_line() {
        let (mesh, _) = load("v 1.0 -2.0 3.5\n");
        assert_eq!(mesh.points, vec![Point::new(1.0, -2.0, 3.5)]);
    }

    #[test]
    fn test_points_keep_file_order() {
        let (mesh, _) = load("v 1 0 0\nv 0 1 0\nv 0 0 1\n");
        assert_eq!(
            mesh.points,
            vec![
                Point::new(1.0, 0.0, 0.0),
                Point::new(0.0, 1.0, 0.0),
                Point::new(0.0, 0.0, 1.0),
            ]
        );
    }

    #[test]
    fn test_face_line_is_zero_based() {
        let (mesh, _) = load("f 2 3 4\n");
        assert_eq!(mesh.faces, vec![Face::new(vec![1, 2, 3])]);
    }

    #[test]
    fn test_face_index_truncates() {
        let (mesh, _) = load("f 2.9 3 4\n");
        assert_eq!(mesh.faces[0].indices, vec![1, 2, 3]);
    }

    #[test]
    fn test_slash_face_uses_position_index() {
        let (mesh, report) = load("f 1/1/1 2/2/2 3/3/3\n");
        assert_eq!(mesh.faces[0].indices, vec![0, 1, 2]);
        assert_eq!(report.coerced_tokens, 0);
    }

    #[test]
    fn test_irregular_spacing_corrupts_face() {
        // 空 token 按 0 处理，减 1 后得到 -1
        let (mesh, report) = load("f  2   3 4\n");
        assert_eq!(mesh.faces[0].indices, vec![-1, 1, -1, -1, 2, 3]);
        assert_eq!(report.coerced_tokens, 3);
    }

    #[test]
    fn test_irregular_spacing_shifts_vertex() {
        // 多出的空 token 占据 x，真正的 z 被丢弃
        let (mesh, report) = load("v  1 2 3\n");
        assert_eq!(mesh.points[0], Point::new(0.0, 1.0, 2.0));
        assert_eq!(report.coerced_tokens, 1);
    }

    #[test]
    fn test_dangling_exponent_coerced() {
        let (mesh, report) = load("v 1e 2 3\n");
        assert_eq!(mesh.points[0], Point::new(0.0, 2.0, 3.0));
        assert_eq!(report.coerced_tokens, 1);
    }

    #[test]
    fn test_comments_and_blank_lines_only() {
        let (mesh, report) = load("# Blender v2.73\n\n# www.blender.org\n\n");
        assert!(mesh.points.is_empty());
        assert!(mesh.faces.is_empty());
        assert_eq!(report.ignored_lines, 4);
    }

    #[test]
    fn test_other_directives_ignored() {
        let text = "mtllib cube.mtl\no Cube\nv 1 1 1\nvn 0 0 1\nvt 0 0\nusemtl Material\ns off\nf 1 1 1\n";
        let (mesh, report) = load(text);

        assert_eq!(mesh.point_count(), 1);
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(report.ignored_lines, 6);
    }

    #[test]
    fn test_crlf_lines() {
        let (mesh, _) = load("v 1 2 3\r\nf 1 1 1\r\n");
        assert_eq!(mesh.points[0], Point::new(1.0, 2.0, 3.0));
        assert_eq!(mesh.faces[0].indices, vec![0, 0, 0]);
    }

    #[test]
    fn test_stray_carriage_return_kept_in_token() {
        // `v\r` 不是 `v`，整行被忽略
        let (mesh, report) = load("v\r\r\nf\r");
        assert!(mesh.points.is_empty());
        assert!(mesh.faces.is_empty());
        assert_eq!(report.ignored_lines, 2);

        let (mesh, report) = load("v 1 2 3\r");
        assert_eq!(mesh.points[0], Point::new(1.0, 2.0, 3.0));
        assert_eq!(report.coerced_tokens, 0);
    }

    #[test]
    fn test_last_line_without_newline() {
        let (mesh, report) = load("v 1 2 3\nv 4 5 6");
        assert_eq!(mesh.point_count(), 2);
        assert_eq!(report.lines, 2);
    }

    #[test]
    fn test_leading_space_line_is_ignored() {
        let (mesh, _) = load(" v 1 2 3\n");
        assert!(mesh.points.is_empty());
    }

    #[test]
    fn test_non_triangle_faces_accepted() {
        let (mesh, _) = load("v 0 0 0\nf 1 1\nf 1 1 1 1\n");
        assert_eq!(mesh.faces[0].arity(), 2);
        assert_eq!(mesh.faces[1].arity(), 4);
    }

    #[test]
    fn test_lenient_coerces_bad_coordinate() {
        let (mesh, report) = load("v 1 abc 3\n");
        assert_eq!(mesh.points[0], Point::new(1.0, 0.0, 3.0));
        assert_eq!(report.coerced_tokens, 1);
    }

    #[test]
    fn test_strict_reports_line_and_token() {
        let options = LoaderOptions {
            number_policy: NumberPolicy::Strict,
            validate: false,
        };
        let err = ObjLoader::load_from_reader("v 0 0 0\nv 1 abc 3\n".as_bytes(), None, &options)
            .unwrap_err();

        match err {
            crate::core::error::ViewerError::MeshLoading(MeshLoadError::Parse { line, token }) => {
                assert_eq!(line, 2);
                assert_eq!(token, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_option_rejects_out_of_range() {
        let options = LoaderOptions {
            number_policy: NumberPolicy::Lenient,
            validate: true,
        };
        let result = ObjLoader::load_from_reader("v 0 0 0\nf 1 2 3\n".as_bytes(), None, &options);
        assert!(result.is_err());

        let (mesh, _) = load("v 0 0 0\nf 1 2 3\n");
        assert_eq!(mesh.faces[0].indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_options_from_config() {
        let config = LoaderConfig {
            strict_numbers: true,
            validate_faces: true,
            legacy_normals: false,
        };
        let options = LoaderOptions::from_config(&config);
        assert_eq!(options.number_policy, NumberPolicy::Strict);
        assert!(options.validate);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ObjLoader::load_from_file(Path::new("nonexistent.obj"));
        match result {
            Err(crate::core::error::ViewerError::MeshLoading(MeshLoadError::Open { path, .. })) => {
                assert_eq!(path, Path::new("nonexistent.obj"));
            }
            other => panic!("expected open failure, got {other:?}"),
        }
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("triangle.obj");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "# triangle").unwrap();
        writeln!(file, "v 0 0 0").unwrap();
        writeln!(file, "v 1 0 0").unwrap();
        writeln!(file, "v 0 1 0").unwrap();
        writeln!(file, "f 1 2 3").unwrap();
        drop(file);

        let (mesh, report) = ObjLoader::load_from_file_with(&path, &LoaderOptions::default()).unwrap();
        assert_eq!(mesh.name.as_deref(), Some("triangle"));
        assert_eq!(mesh.point_count(), 3);
        assert_eq!(mesh.faces, vec![Face::new(vec![0, 1, 2])]);
        assert_eq!(report.lines, 5);
        assert_eq!(report.ignored_lines, 1);
    }

    #[test]
    fn test_load_from_memory() {
        let mesh = ObjLoader::load_from_memory(b"v 1 2 3\n").unwrap();
        assert!(mesh.name.is_none());
        assert_eq!(mesh.point_count(), 1);
    }
}
