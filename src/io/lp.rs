// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! LabelPlus plain-text format.
//!
//! ```text
//! 1,0
//! -
//! Frame
//! Bubble
//! -
//! comment
//!
//!
//! >>>>>>>>[page01.png]<<<<<<<<
//! ----------------[1]----------------[0.5,0.25,2]
//! Hello
//!
//!
//! ```
//!
//! Group membership is a single one-based digit, so at most nine groups fit.
//! Group colors are not stored; they come from a palette on decode.

use super::BOM;
use crate::error::{DecodeError, ValidationError};
use crate::models::{Group, ProjectFile, TranslationLabel, Version};
use std::collections::HashSet;

/// Most groups the format can reference.
pub const MAX_GROUPS: usize = 9;

const PIC_START: &str = ">>>>>>>>[";
const PIC_END: &str = "]<<<<<<<<";
const LABEL_START: &str = "----------------[";
const LABEL_END: &str = "]----------------";
const PROP_START: char = '[';
const PROP_END: char = ']';
const SPLIT: char = ',';
const SEPARATOR: &str = "-";

/// Encode a project, writing picture blocks in the given order.
///
/// Pictures the order does not mention are appended in insertion order so
/// that nothing is dropped. The output starts with a UTF-8 BOM.
pub fn encode(project: &ProjectFile, order: &[String]) -> Result<Vec<u8>, ValidationError> {
    check_representable(project)?;

    let Version { major, minor } = project.version();
    let mut out = String::new();
    out.push_str(&format!("{major}{SPLIT}{minor}\n"));
    out.push_str(SEPARATOR);
    out.push('\n');
    out.push_str(&project.group_names().join("\n"));
    out.push('\n');
    out.push_str(SEPARATOR);
    out.push('\n');
    out.push_str(project.comment());
    out.push_str("\n\n\n");

    for (picture, labels) in picture_order(project, order) {
        out.push_str(PIC_START);
        out.push_str(picture);
        out.push_str(PIC_END);
        out.push('\n');
        for label in labels {
            push_label(&mut out, label);
        }
        out.push('\n');
    }

    let mut bytes = Vec::with_capacity(BOM.len() + out.len());
    bytes.extend_from_slice(&BOM);
    bytes.extend_from_slice(out.as_bytes());
    Ok(bytes)
}

/// Reject projects whose text would read back as something else.
fn check_representable(project: &ProjectFile) -> Result<(), ValidationError> {
    let count = project.group_count();
    if count > MAX_GROUPS {
        return Err(ValidationError::TooManyGroups {
            count,
            max: MAX_GROUPS,
        });
    }

    for name in project.group_names() {
        if name == SEPARATOR || name.trim() != name || name.contains('\n') {
            return Err(ValidationError::GroupNameNotRepresentable(name.to_string()));
        }
    }

    if project.comment().split('\n').any(is_picture_header) {
        return Err(ValidationError::CommentNotRepresentable);
    }

    for (picture, labels) in project.pictures() {
        if picture.contains('\n') {
            return Err(ValidationError::PictureNameNotRepresentable(picture.to_string()));
        }
        for label in labels {
            if label
                .text
                .split('\n')
                .any(|line| is_label_header(line) || is_picture_header(line))
            {
                return Err(ValidationError::LabelTextNotRepresentable {
                    picture: picture.to_string(),
                    index: label.index,
                });
            }
        }
    }
    Ok(())
}

fn picture_order<'a>(
    project: &'a ProjectFile,
    order: &'a [String],
) -> Vec<(&'a str, &'a [TranslationLabel])> {
    let mut seen = HashSet::new();
    let mut pictures = Vec::with_capacity(project.picture_count());
    for name in order {
        let Ok(labels) = project.labels(name) else {
            log::warn!("Picture order names unknown picture {name:?}, skipping");
            continue;
        };
        if seen.insert(name.as_str()) {
            pictures.push((name.as_str(), labels));
        }
    }
    for (name, labels) in project.pictures() {
        if seen.insert(name) {
            log::warn!("Picture {name:?} missing from picture order, appending");
            pictures.push((name, labels));
        }
    }
    pictures
}

fn push_label(out: &mut String, label: &TranslationLabel) {
    out.push_str(&format!(
        "{LABEL_START}{}{LABEL_END}{PROP_START}{}{SPLIT}{}{SPLIT}{}{PROP_END}\n",
        label.index,
        format_coordinate(label.x),
        format_coordinate(label.y),
        label.group_id + 1
    ));
    out.push_str(&label.text);
    out.push_str("\n\n");
}

/// Shortest round-trip form, always with a fractional part (`1.0`, `0.25`).
fn format_coordinate(value: f64) -> String {
    let text = value.to_string();
    if text.contains('.') {
        text
    } else {
        format!("{text}.0")
    }
}

/// Decode LP text. Groups get colors from `palette` by position.
pub fn decode(bytes: &[u8], palette: &[String]) -> Result<ProjectFile, DecodeError> {
    let text = std::str::from_utf8(super::strip_bom(bytes))?;
    let mut lines: Vec<&str> = text.split('\n').collect();
    if text.ends_with('\n') {
        lines.pop();
    }
    // CRLF files are recognized by the version line; a `\r` inside text
    // written with LF endings is content.
    if lines.first().is_some_and(|line| line.ends_with('\r')) {
        lines = lines
            .into_iter()
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();
    }
    Parser::new(lines, palette).parse()
}

struct Parser<'a> {
    lines: Vec<&'a str>,
    pos: usize,
    palette: &'a [String],
}

impl<'a> Parser<'a> {
    fn new(lines: Vec<&'a str>, palette: &'a [String]) -> Self {
        Self {
            lines,
            pos: 0,
            palette,
        }
    }

    /// One-based number of the current line.
    fn line_no(&self) -> usize {
        self.pos + 1
    }

    fn parse(mut self) -> Result<ProjectFile, DecodeError> {
        let version = self.parse_version()?;
        self.expect_separator()?;

        let mut project = ProjectFile::with_version(version, "");
        self.parse_groups(&mut project)?;
        project.set_comment(self.parse_comment());

        while self.pos < self.lines.len() {
            self.parse_picture(&mut project)?;
        }

        log::debug!(
            "Decoded LP file: {} groups, {} pictures, {} labels",
            project.group_count(),
            project.picture_count(),
            project.label_count()
        );
        Ok(project)
    }

    fn parse_version(&mut self) -> Result<Version, DecodeError> {
        let line = *self.lines.first().ok_or(DecodeError::MissingVersion)?;
        if line.trim().is_empty() {
            return Err(DecodeError::MissingVersion);
        }
        let malformed = || DecodeError::MalformedVersion {
            line: 1,
            content: line.to_string(),
        };
        let parts: Vec<&str> = line.trim().split(SPLIT).collect();
        let [major, minor] = parts.as_slice() else {
            return Err(malformed());
        };
        let major = major.trim().parse().map_err(|_| malformed())?;
        let minor = minor.trim().parse().map_err(|_| malformed())?;
        self.pos = 1;
        Ok(Version::new(major, minor))
    }

    fn expect_separator(&mut self) -> Result<(), DecodeError> {
        match self.lines.get(self.pos) {
            Some(line) if line.trim() == SEPARATOR => {
                self.pos += 1;
                Ok(())
            }
            _ => Err(DecodeError::MissingSeparator {
                line: self.line_no(),
            }),
        }
    }

    fn parse_groups(&mut self, project: &mut ProjectFile) -> Result<(), DecodeError> {
        loop {
            let Some(line) = self.lines.get(self.pos) else {
                return Err(DecodeError::MissingSeparator {
                    line: self.line_no(),
                });
            };
            let name = line.trim();
            if name == SEPARATOR {
                self.pos += 1;
                return Ok(());
            }
            if !name.is_empty() {
                let line_no = self.line_no();
                let content = |source| DecodeError::Content {
                    line: line_no,
                    source,
                };
                let group = Group::with_palette(name, project.group_count(), self.palette)
                    .map_err(content)?;
                project.add_group(group).map_err(content)?;
            }
            self.pos += 1;
        }
    }

    /// Everything up to the first picture header, minus the two blank
    /// lines the writer puts after the comment.
    fn parse_comment(&mut self) -> String {
        let start = self.pos;
        while self.pos < self.lines.len() && !is_picture_header(self.lines[self.pos]) {
            self.pos += 1;
        }
        trim_blank_lines(&self.lines[start..self.pos], 2).join("\n")
    }

    fn parse_picture(&mut self, project: &mut ProjectFile) -> Result<(), DecodeError> {
        let line_no = self.line_no();
        let header = self.lines[self.pos];
        let picture = header
            .strip_prefix(PIC_START)
            .and_then(|rest| rest.strip_suffix(PIC_END))
            .ok_or_else(|| DecodeError::UnexpectedContent {
                line: line_no,
                content: header.to_string(),
            })?;
        project
            .add_picture(picture)
            .map_err(|source| DecodeError::Content {
                line: line_no,
                source,
            })?;
        self.pos += 1;

        while let Some(&line) = self.lines.get(self.pos) {
            if is_picture_header(line) {
                break;
            }
            if is_label_header(line) {
                self.parse_label(project, picture)?;
            } else if line.trim().is_empty() {
                self.pos += 1;
            } else {
                return Err(DecodeError::UnexpectedContent {
                    line: self.line_no(),
                    content: line.to_string(),
                });
            }
        }
        Ok(())
    }

    fn parse_label(&mut self, project: &mut ProjectFile, picture: &str) -> Result<(), DecodeError> {
        let line_no = self.line_no();
        let (index, x, y, group) = parse_label_header(self.lines[self.pos], line_no)?;

        let count = project.group_count();
        if group == 0 || group as usize > count {
            return Err(DecodeError::GroupOutOfRange {
                line: line_no,
                group,
                count,
            });
        }
        self.pos += 1;

        let start = self.pos;
        while self.pos < self.lines.len()
            && !is_label_header(self.lines[self.pos])
            && !is_picture_header(self.lines[self.pos])
        {
            self.pos += 1;
        }
        // One blank line follows every label, one more ends the picture.
        let last_in_picture = self
            .lines
            .get(self.pos)
            .map_or(true, |line| is_picture_header(line));
        let text = trim_blank_lines(
            &self.lines[start..self.pos],
            if last_in_picture { 2 } else { 1 },
        );

        let label = TranslationLabel::new(index, x, y, group as usize - 1, text.join("\n"));
        project
            .add_label(picture, label)
            .map_err(|source| DecodeError::Content {
                line: line_no,
                source,
            })
    }
}

fn is_picture_header(line: &str) -> bool {
    line.starts_with(PIC_START) && line.ends_with(PIC_END)
}

fn is_label_header(line: &str) -> bool {
    line.starts_with(LABEL_START) && line.contains(LABEL_END)
}

/// Parse `----------------[index]----------------[x,y,group]`.
fn parse_label_header(line: &str, line_no: usize) -> Result<(u32, f64, f64, u32), DecodeError> {
    let malformed = || DecodeError::MalformedLabel {
        line: line_no,
        content: line.to_string(),
    };
    let rest = line.strip_prefix(LABEL_START).ok_or_else(malformed)?;
    let (index, props) = rest.split_once(LABEL_END).ok_or_else(malformed)?;
    let props = props
        .trim_end()
        .strip_prefix(PROP_START)
        .and_then(|p| p.strip_suffix(PROP_END))
        .ok_or_else(malformed)?;

    let fields: Vec<&str> = props.split(SPLIT).map(str::trim).collect();
    let [x, y, group] = fields.as_slice() else {
        return Err(DecodeError::PropertyArity {
            line: line_no,
            found: fields.len(),
        });
    };

    let invalid = |field: &'static str, value: &str| DecodeError::InvalidProperty {
        line: line_no,
        field,
        value: value.to_string(),
    };
    let index = index.trim().parse().map_err(|_| invalid("index", index))?;
    let x = x.parse().map_err(|_| invalid("x", x))?;
    let y = y.parse().map_err(|_| invalid("y", y))?;
    let group = group.parse().map_err(|_| invalid("group", group))?;
    Ok((index, x, y, group))
}

/// Drop up to `max` trailing empty lines.
fn trim_blank_lines<'a, 'b>(mut lines: &'a [&'b str], max: usize) -> &'a [&'b str] {
    for _ in 0..max {
        match lines.split_last() {
            Some((last, rest)) if last.is_empty() => lines = rest,
            _ => break,
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::group::default_palette;
    use pretty_assertions::assert_eq;

    fn palette(colors: &[&str]) -> Vec<String> {
        colors.iter().map(|c| c.to_string()).collect()
    }

    fn scenario() -> ProjectFile {
        let mut project = ProjectFile::with_version(Version::new(1, 0), "Test comment");
        project.add_group(Group::new("Group_1", "FF0000").unwrap()).unwrap();
        project.add_group(Group::new("Group_2", "00FF00").unwrap()).unwrap();
        project.add_picture("page01.png").unwrap();
        project
            .add_label("page01.png", TranslationLabel::new(1, 0.5, 0.25, 1, "Hello"))
            .unwrap();
        project
    }

    fn encode_sorted(project: &ProjectFile) -> Vec<u8> {
        encode(project, &project.sorted_picture_names()).unwrap()
    }

    #[test]
    fn test_encode_layout() {
        let bytes = encode_sorted(&scenario());
        assert_eq!(&bytes[..3], &BOM);
        let text = std::str::from_utf8(&bytes[3..]).unwrap();
        assert_eq!(
            text,
            "1,0\n-\nGroup_1\nGroup_2\n-\nTest comment\n\n\n\
             >>>>>>>>[page01.png]<<<<<<<<\n\
             ----------------[1]----------------[0.5,0.25,2]\n\
             Hello\n\n\n"
        );
    }

    #[test]
    fn test_scenario_round_trip() {
        let project = scenario();
        let bytes = encode_sorted(&project);
        let decoded = decode(&bytes, &palette(&["FF0000", "00FF00"])).unwrap();
        assert_eq!(decoded, project);
    }

    #[test]
    fn test_decode_assigns_palette_colors() {
        let bytes = encode_sorted(&scenario());
        let decoded = decode(&bytes, &default_palette()).unwrap();
        assert_eq!(decoded.group(0).unwrap().color(), "FF0000");
        assert_eq!(decoded.group(1).unwrap().color(), "0000FF");
    }

    #[test]
    fn test_group_ceiling() {
        let mut project = ProjectFile::new();
        for i in 0..9 {
            project
                .add_group(Group::new(format!("G{i}"), "000000").unwrap())
                .unwrap();
        }
        assert!(encode(&project, &[]).is_ok());

        project.add_group(Group::new("G9", "000000").unwrap()).unwrap();
        assert_eq!(
            encode(&project, &[]),
            Err(ValidationError::TooManyGroups { count: 10, max: 9 })
        );
    }

    #[test]
    fn test_multiline_text_and_order_preserved() {
        let mut project = scenario();
        project.add_picture("2.png").unwrap();
        project.add_picture("10.png").unwrap();
        for (index, text) in [(3, "line one\nline two"), (1, ""), (2, "trailing\n")] {
            project
                .add_label("10.png", TranslationLabel::new(index, 1.0, 0.0, 0, text))
                .unwrap();
        }
        project
            .add_label("2.png", TranslationLabel::new(7, 0.125, 0.75, 1, "x"))
            .unwrap();

        let bytes = encode_sorted(&project);
        let text = std::str::from_utf8(&bytes).unwrap();
        assert!(text.find("[2.png]").unwrap() < text.find("[10.png]").unwrap());
        assert!(text.contains("[1.0,0.0,1]"));

        let decoded = decode(&bytes, &palette(&["FF0000", "00FF00"])).unwrap();
        assert_eq!(decoded, project);
        let indices: Vec<u32> = decoded
            .labels("10.png")
            .unwrap()
            .iter()
            .map(|l| l.index)
            .collect();
        assert_eq!(indices, [3, 1, 2]);
    }

    #[test]
    fn test_decode_without_bom_and_crlf() {
        let text = "1,0\r\n-\r\nA\r\n-\r\nc\r\n\r\n\r\n>>>>>>>>[p.png]<<<<<<<<\r\n\
                    ----------------[1]----------------[0.1,0.2,1]\r\nhi\r\n\r\n\r\n";
        let project = decode(text.as_bytes(), &default_palette()).unwrap();
        assert_eq!(project.comment(), "c");
        assert_eq!(project.label("p.png", 1).unwrap().text, "hi");
    }

    #[test]
    fn test_partial_order_keeps_every_picture() {
        let mut project = scenario();
        project.add_picture("b.png").unwrap();
        project
            .add_label("b.png", TranslationLabel::new(1, 0.5, 0.5, 0, "bee"))
            .unwrap();

        let order = ["b.png".to_string(), "missing.png".to_string()];
        let bytes = encode(&project, &order).unwrap();
        let text = std::str::from_utf8(&bytes).unwrap();
        assert!(text.find("[b.png]").unwrap() < text.find("[page01.png]").unwrap());
        assert!(!text.contains("missing.png"));

        let decoded = decode(&bytes, &palette(&["FF0000", "00FF00"])).unwrap();
        assert_eq!(decoded, project);
    }

    #[test]
    fn test_carriage_return_in_text_kept() {
        let mut project = scenario();
        project.set_comment("note\r\nsecond");
        project.set_label_text("page01.png", 1, "a\r\nb").unwrap();

        let decoded = decode(&encode_sorted(&project), &palette(&["FF0000", "00FF00"])).unwrap();
        assert_eq!(decoded.comment(), "note\r\nsecond");
        assert_eq!(decoded.label("page01.png", 1).unwrap().text, "a\r\nb");
        assert_eq!(decoded, project);
    }

    #[test]
    fn test_unrepresentable_group_names_rejected() {
        for name in ["-", "\tTab", "Tail\t", "two\nlines"] {
            let mut project = ProjectFile::with_version(Version::new(1, 0), "c");
            project.add_group(Group::new("A", "FF0000").unwrap()).unwrap();
            project.add_group(Group::new(name, "00FF00").unwrap()).unwrap();
            project.add_group(Group::new("B", "0000FF").unwrap()).unwrap();
            assert_eq!(
                encode(&project, &[]),
                Err(ValidationError::GroupNameNotRepresentable(name.to_string())),
                "group {name:?}"
            );
        }
    }

    #[test]
    fn test_unrepresentable_picture_name_rejected() {
        let mut project = scenario();
        project.add_picture("page\n02.png").unwrap();
        assert_eq!(
            encode(&project, &[]),
            Err(ValidationError::PictureNameNotRepresentable("page\n02.png".to_string()))
        );
    }

    #[test]
    fn test_header_lines_in_text_rejected() {
        let mut project = scenario();
        project.set_comment("intro\n>>>>>>>>[fake.png]<<<<<<<<");
        assert_eq!(
            encode(&project, &[]),
            Err(ValidationError::CommentNotRepresentable)
        );

        let mut project = scenario();
        project
            .set_label_text("page01.png", 1, "x\n----------------[2]----------------[0.1,0.1,1]")
            .unwrap();
        assert_eq!(
            encode(&project, &[]),
            Err(ValidationError::LabelTextNotRepresentable {
                picture: "page01.png".to_string(),
                index: 1,
            })
        );
    }

    #[test]
    fn test_empty_project_round_trip() {
        let project = ProjectFile::with_version(Version::new(2, 3), "");
        let decoded = decode(&encode_sorted(&project), &default_palette()).unwrap();
        assert_eq!(decoded, project);
    }

    #[test]
    fn test_structural_errors() {
        let p = default_palette();
        assert!(matches!(decode(b"", &p), Err(DecodeError::MissingVersion)));
        assert!(matches!(
            decode(b"1.0\n-\n", &p),
            Err(DecodeError::MalformedVersion { line: 1, .. })
        ));
        assert!(matches!(
            decode(b"1,0\nA\n-\n", &p),
            Err(DecodeError::MissingSeparator { line: 2 })
        ));
        assert!(matches!(
            decode(b"1,0\n-\nA\n", &p),
            Err(DecodeError::MissingSeparator { line: 4 })
        ));

        let arity = "1,0\n-\nA\n-\n\n>>>>>>>>[p]<<<<<<<<\n----------------[1]----------------[0.1,0.2]\nx\n";
        assert!(matches!(
            decode(arity.as_bytes(), &p),
            Err(DecodeError::PropertyArity { line: 7, found: 2 })
        ));

        let bad_x = "1,0\n-\nA\n-\n\n>>>>>>>>[p]<<<<<<<<\n----------------[1]----------------[a,0.2,1]\nx\n";
        assert!(matches!(
            decode(bad_x.as_bytes(), &p),
            Err(DecodeError::InvalidProperty { field: "x", .. })
        ));

        let stray = "1,0\n-\nA\n-\n\n>>>>>>>>[p]<<<<<<<<\nstray\n";
        assert!(matches!(
            decode(stray.as_bytes(), &p),
            Err(DecodeError::UnexpectedContent { line: 7, .. })
        ));
    }

    #[test]
    fn test_group_reference_out_of_range() {
        let p = default_palette();
        for digit in ["0", "3"] {
            let text = format!(
                "1,0\n-\nA\nB\n-\n\n>>>>>>>>[p]<<<<<<<<\n----------------[1]----------------[0.1,0.2,{digit}]\nx\n"
            );
            assert!(matches!(
                decode(text.as_bytes(), &p),
                Err(DecodeError::GroupOutOfRange { line: 8, count: 2, .. })
            ));
        }
    }

    #[test]
    fn test_content_errors_carry_line() {
        let p = default_palette();
        let dup = "1,0\n-\nA\n-\n\n>>>>>>>>[p]<<<<<<<<\n\
                   ----------------[1]----------------[0.1,0.2,1]\nx\n\n\
                   ----------------[1]----------------[0.3,0.4,1]\ny\n";
        assert!(matches!(
            decode(dup.as_bytes(), &p),
            Err(DecodeError::Content { line: 10, .. })
        ));

        let dup_group = "1,0\n-\nA\nA\n-\n";
        assert!(matches!(
            decode(dup_group.as_bytes(), &p),
            Err(DecodeError::Content { line: 4, .. })
        ));
    }
}
