use crate::error::HuginnMinutiaeError;
use crate::gallery::{CandidateRecord, Gallery};
use crate::minutiae::{DetectionResult, Frame, Minutia, MinutiaKind};
use nom::branch::alt;
use nom::bytes::complete::{tag, take_till1, take_while, take_while1};
use nom::character::complete::{char, i32 as parse_i32, space0};
use nom::combinator::{all_consuming, map, map_res, rest, value};
use nom::multi::separated_list0;
use nom::sequence::{delimited, preceded, separated_pair};
use nom::{IResult, Parser};
use std::str::FromStr;
use tracing::{trace, warn};

impl FromStr for MinutiaKind {
    type Err = HuginnMinutiaeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (_, kind) = all_consuming(parse_kind)
            .parse(s.trim())
            .map_err(|err| HuginnMinutiaeError::Parse(format!("fail to parse kind: {s}, {err}")))?;
        Ok(kind)
    }
}

impl FromStr for Minutia {
    type Err = HuginnMinutiaeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (_, minutia) = all_consuming(parse_minutia).parse(s.trim()).map_err(|err| {
            HuginnMinutiaeError::Parse(format!("fail to parse minutia: {s}, {err}"))
        })?;
        Ok(minutia)
    }
}

impl FromStr for DetectionResult {
    type Err = HuginnMinutiaeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (_, result) = all_consuming(parse_detection_result)
            .parse(s.trim())
            .map_err(|err| {
                HuginnMinutiaeError::Parse(format!("fail to parse signature: {s}, {err}"))
            })?;
        Ok(result)
    }
}

impl FromStr for Gallery {
    type Err = HuginnMinutiaeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut candidates: Vec<CandidateRecord> = vec![];
        let mut pending_label: Option<String> = None;
        let mut cur_mod: Option<String> = None;

        for (line_no, line) in s.lines().enumerate() {
            let line = line.trim();

            if line.is_empty() || line.starts_with(';') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                let (_, module) = parse_module(line).map_err(|err| {
                    HuginnMinutiaeError::Parse(format!("fail to parse `module`: {line}, {err}"))
                })?;
                if let Some(label) = pending_label.take() {
                    return Err(HuginnMinutiaeError::Parse(format!(
                        "`label` without `sig`: {label}"
                    )));
                }
                cur_mod = Some(module.to_string());
                continue;
            }

            let Some(module) = cur_mod.as_deref() else {
                return Err(HuginnMinutiaeError::Parse(format!(
                    "value outside of a section at line {}: {line}",
                    line_no + 1
                )));
            };

            let (_, (name, value)) = parse_named_value(line).map_err(|err| {
                HuginnMinutiaeError::Parse(format!("fail to parse named value: {line}, {err}"))
            })?;

            match (module, name) {
                ("candidate", "label") => {
                    if let Some(label) = pending_label.replace(value.to_string()) {
                        return Err(HuginnMinutiaeError::Parse(format!(
                            "`label` without `sig`: {label}"
                        )));
                    }
                }
                ("candidate", "sig") => {
                    let Some(id) = pending_label.take() else {
                        return Err(HuginnMinutiaeError::Parse(format!(
                            "candidate signature without `label`: {value}"
                        )));
                    };
                    let features: DetectionResult = value.parse()?;

                    trace!("sig for `{}`: {} minutiae", id, features.len());

                    candidates.push(CandidateRecord::new(id, features));
                }
                _ => {
                    warn!("skip `{name}` in unknown module `{module}`: {value}");
                }
            }
        }

        if let Some(label) = pending_label {
            return Err(HuginnMinutiaeError::Parse(format!("`label` without `sig`: {label}")));
        }

        Ok(Gallery::new(candidates))
    }
}

fn parse_detection_result(input: &str) -> IResult<&str, DetectionResult> {
    map(
        (
            delimited(tag("frame="), parse_frame, char('|')),
            separated_list0(char(';'), parse_minutia),
        ),
        |(frame, minutiae)| DetectionResult::new(frame, minutiae),
    )
    .parse(input)
}

fn parse_frame(input: &str) -> IResult<&str, Frame> {
    map(
        (parse_i32, char(','), parse_i32, char(','), parse_i32, char(','), parse_i32),
        |(min_x, _, min_y, _, max_x, _, max_y)| Frame::new(min_x, min_y, max_x, max_y),
    )
    .parse(input)
}

fn parse_minutia(input: &str) -> IResult<&str, Minutia> {
    map(
        (parse_i32, char(':'), parse_i32, char(':'), parse_angle, char(':'), parse_kind),
        |(x, _, y, _, angle, _, kind)| Minutia::new(x, y, angle, kind),
    )
    .parse(input)
}

/// Angles are written in shortest round-trip form, so `str::parse` restores the exact bits.
fn parse_angle(input: &str) -> IResult<&str, f64> {
    map_res(take_till1(|c: char| c == ':' || c == ';' || c == '|'), str::parse::<f64>).parse(input)
}

fn parse_kind(input: &str) -> IResult<&str, MinutiaKind> {
    alt((
        value(MinutiaKind::RidgeEnding, char('E')),
        value(MinutiaKind::Bifurcation, char('B')),
    ))
    .parse(input)
}

fn parse_module(input: &str) -> IResult<&str, &str> {
    delimited(char('['), take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_'), char(']'))
        .parse(input)
}

fn parse_named_value(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
        (space0, char('='), space0),
        map(preceded(space0, rest), str::trim),
    )
    .parse(input)
}
