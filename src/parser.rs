use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use crate::{
    datatypes::{
        BoundaryGroups, BoundaryKind, BoundarySegment, CulvertBoundary, CulvertPair, Element,
        FlowlessBoundary, Mesh, Node, OceanBoundary, OutflowBoundary, OutflowNode, WeirBoundary,
        WeirPair,
    },
    error::{ParseError, Section},
};

/// Upper bound on up-front allocation taken from header counts
const PREALLOCATE_LIMIT: usize = 1 << 20;

/// Legacy NOPE value for a mesh without open ocean boundaries
const NO_OCEAN_BOUNDARIES: i64 = -1;

/// One physical line of the input
struct Record {
    number: usize,
    section: Section,
    text: String,
}

impl Record {
    fn malformed(&self, reason: impl Into<String>) -> ParseError {
        ParseError::MalformedRecord {
            line: self.number,
            section: self.section,
            text: self.text.clone(),
            reason: reason.into(),
        }
    }

    /// Splits the line and checks it holds at least `N` fields. Extra fields
    /// are trailing comments and are ignored.
    fn fields<const N: usize>(&self) -> Result<[&str; N], ParseError> {
        let mut fields = [""; N];
        let mut tokens = self.text.split_whitespace();

        for (i, field) in fields.iter_mut().enumerate() {
            *field = match tokens.next() {
                Some(token) => token,
                None => {
                    return Err(self.malformed(format!("expected {} field(s), found {}", N, i)));
                }
            };
        }

        Ok(fields)
    }

    fn int(&self, token: &str, what: &str) -> Result<i64, ParseError> {
        token
            .parse()
            .map_err(|_| self.malformed(format!("non-integer {what} {token:?}")))
    }

    fn float(&self, token: &str, what: &str) -> Result<f64, ParseError> {
        token
            .parse()
            .map_err(|_| self.malformed(format!("non-numeric {what} {token:?}")))
    }

    /// Reads a record count from the first field
    fn count(&self, what: &str) -> Result<usize, ParseError> {
        let [token] = self.fields::<1>()?;
        self.non_negative(self.int(token, what)?, what)
    }

    fn non_negative(&self, value: i64, what: &str) -> Result<usize, ParseError> {
        usize::try_from(value).map_err(|_| self.malformed(format!("negative {what} {value}")))
    }

    /// Converts a 1-based node reference into a checked 0-based index
    fn node_index(&self, token: &str, node_count: usize) -> Result<usize, ParseError> {
        let raw = self.int(token, "node index")?;

        match raw.checked_sub(1).map(usize::try_from) {
            Some(Ok(index)) if index < node_count => Ok(index),
            _ => Err(ParseError::NodeIndexOutOfRange {
                line: self.number,
                section: self.section,
                text: self.text.clone(),
                index: raw,
                node_count,
            }),
        }
    }
}

/// Sequential reader for the fort.14 grammar
pub struct Fort14Parser<R> {
    reader: R,
    buffer: Vec<u8>,
    line_number: usize,
}

impl<R: BufRead> Fort14Parser<R> {
    pub fn new(reader: R) -> Fort14Parser<R> {
        Fort14Parser {
            reader,
            buffer: Vec::new(),
            line_number: 0,
        }
    }

    /// Reads the next line, or None at end of input. The description is free
    /// text and is decoded lossily; every other line must be UTF-8.
    fn try_next_record(&mut self, section: Section) -> Result<Option<Record>, ParseError> {
        self.buffer.clear();
        let read = self
            .reader
            .read_until(b'\n', &mut self.buffer)
            .map_err(|source| ParseError::Read {
                line: self.line_number + 1,
                source,
            })?;
        if read == 0 {
            return Ok(None);
        }
        self.line_number += 1;

        let mut bytes = self.buffer.as_slice();
        if let Some(stripped) = bytes.strip_suffix(b"\n") {
            bytes = stripped;
            if let Some(stripped) = bytes.strip_suffix(b"\r") {
                bytes = stripped;
            }
        }

        let text = match std::str::from_utf8(bytes) {
            Ok(text) => text.to_owned(),
            Err(_) if section == Section::Description => {
                String::from_utf8_lossy(bytes).into_owned()
            }
            Err(_) => {
                return Err(ParseError::MalformedRecord {
                    line: self.line_number,
                    section,
                    text: String::from_utf8_lossy(bytes).into_owned(),
                    reason: "invalid UTF-8".to_string(),
                })
            }
        };

        Ok(Some(Record {
            number: self.line_number,
            section,
            text,
        }))
    }

    /// Reads a line that a declared count still requires
    ///
    /// # Arguments
    /// * `section` - The section being read
    /// * `remaining` - How many records the section still expects, this one included
    fn next_record(&mut self, section: Section, remaining: usize) -> Result<Record, ParseError> {
        match self.try_next_record(section)? {
            Some(record) => Ok(record),
            None => Err(ParseError::TruncatedInput {
                line: self.line_number + 1,
                section,
                remaining,
            }),
        }
    }

    /// Parses the whole input into a Mesh
    ///
    /// # Returns
    /// The parsed mesh, or the first error encountered. Nothing partial is
    /// returned on failure.
    pub fn parse(mut self) -> Result<Mesh, ParseError> {
        let description = self.next_record(Section::Description, 1)?.text;

        let header = self.next_record(Section::Header, 1)?;
        let [ne, np] = header.fields::<2>()?;
        let element_count = header.non_negative(header.int(ne, "element count")?, "element count")?;
        let node_count = header.non_negative(header.int(np, "node count")?, "node count")?;

        let nodes = self.parse_nodes(node_count)?;
        let elements = self.parse_elements(element_count, node_count)?;
        let boundaries = self.parse_boundaries(node_count)?;

        Ok(Mesh {
            description,
            nodes,
            elements,
            boundaries,
        })
    }

    fn parse_nodes(&mut self, node_count: usize) -> Result<Vec<Node>, ParseError> {
        let mut nodes: Vec<Node> = Vec::with_capacity(node_count.min(PREALLOCATE_LIMIT));

        for id in 0..node_count {
            let record = self.next_record(Section::Nodes, node_count - id)?;
            let [node_id, x, y, z] = record.fields::<4>()?;

            record.int(node_id, "node id")?;

            nodes.push(Node {
                id,
                x: record.float(x, "x coordinate")?,
                y: record.float(y, "y coordinate")?,
                z: -record.float(z, "elevation")?,
            });
        }

        Ok(nodes)
    }

    fn parse_elements(
        &mut self,
        element_count: usize,
        node_count: usize,
    ) -> Result<Vec<Element>, ParseError> {
        let mut elements: Vec<Element> = Vec::with_capacity(element_count.min(PREALLOCATE_LIMIT));

        for i in 0..element_count {
            let record = self.next_record(Section::Elements, element_count - i)?;
            let [id, vertex_count] = record.fields::<2>()?;

            let id = record.float(id, "element id")?;
            let vertex_count = record.int(vertex_count, "vertex count")?;
            if vertex_count != 3 {
                return Err(ParseError::UnsupportedElementShape {
                    line: record.number,
                    text: record.text,
                    vertex_count,
                });
            }

            let [_, _, v1, v2, v3] = record.fields::<5>()?;
            elements.push(Element {
                id,
                vertices: [
                    record.node_index(v1, node_count)?,
                    record.node_index(v2, node_count)?,
                    record.node_index(v3, node_count)?,
                ],
            });
        }

        Ok(elements)
    }

    /// Parses the optional open ocean section and the land/flow section that
    /// follows it. A mesh ending right after its elements has no boundaries.
    fn parse_boundaries(&mut self, node_count: usize) -> Result<BoundaryGroups, ParseError> {
        let mut groups = BoundaryGroups::default();

        let nope_record = match self.try_next_record(Section::OceanBoundaries)? {
            Some(record) if !record.text.trim().is_empty() => record,
            _ => return Ok(groups),
        };

        let [nope] = nope_record.fields::<1>()?;
        let nope = match nope_record.int(nope, "open boundary count")? {
            NO_OCEAN_BOUNDARIES => 0,
            n => nope_record.non_negative(n, "open boundary count")?,
        };

        // total open boundary nodes, unused
        self.next_record(Section::OceanBoundaries, nope + 1)?;

        for group in 0..nope {
            let neta = self
                .next_record(Section::OceanBoundaries, nope - group)?
                .count("open boundary node count")?;

            let mut boundary = OceanBoundary {
                indexes: Vec::with_capacity(neta.min(PREALLOCATE_LIMIT)),
            };
            for i in 0..neta {
                let record = self.next_record(Section::OceanBoundaries, neta - i)?;
                let [index] = record.fields::<1>()?;
                boundary.indexes.push(record.node_index(index, node_count)?);
            }
            groups.ocean.push(boundary);
        }

        let nbou = self
            .next_record(Section::OtherBoundaries, 1)?
            .count("boundary count")?;

        // total boundary nodes, unused
        self.next_record(Section::OtherBoundaries, nbou + 1)?;

        for group in 0..nbou {
            let header = self.next_record(Section::OtherBoundaries, nbou - group)?;
            let [nvell, ibtype] = header.fields::<2>()?;
            let nvell = header.non_negative(header.int(nvell, "segment length")?, "segment length")?;
            let raw_ibtype = header.int(ibtype, "IBTYPE")?;

            let (kind, ibtype) = match i32::try_from(raw_ibtype)
                .ok()
                .and_then(|code| BoundaryKind::from_ibtype(code).map(|kind| (kind, code)))
            {
                Some(found) => found,
                None => {
                    return Err(ParseError::UnknownBoundaryType {
                        line: header.number,
                        text: header.text,
                        ibtype: raw_ibtype,
                    })
                }
            };

            groups.push(self.parse_segment(kind, ibtype, nvell, node_count)?);
        }

        Ok(groups)
    }

    /// Reads the `nvell` lines of one land/flow segment
    ///
    /// # Arguments
    /// * `kind` - The category decided from the segment's IBTYPE
    /// * `ibtype` - The raw type code, kept on the segment
    /// * `nvell` - Number of lines in the segment
    /// * `node_count` - Number of nodes, for index validation
    fn parse_segment(
        &mut self,
        kind: BoundaryKind,
        ibtype: i32,
        nvell: usize,
        node_count: usize,
    ) -> Result<BoundarySegment, ParseError> {
        let segment = match kind {
            BoundaryKind::Land | BoundaryKind::Inner | BoundaryKind::Inflow => {
                let indexes = self.read_rows(nvell, |record| {
                    let [index] = record.fields::<1>()?;
                    record.node_index(index, node_count)
                })?;
                let boundary = FlowlessBoundary { ibtype, indexes };

                match kind {
                    BoundaryKind::Land => BoundarySegment::Land(boundary),
                    BoundaryKind::Inner => BoundarySegment::Inner(boundary),
                    _ => BoundarySegment::Inflow(boundary),
                }
            }
            BoundaryKind::Outflow => {
                let nodes = self.read_rows(nvell, |record| {
                    let [index, height, supercritical] = record.fields::<3>()?;
                    Ok(OutflowNode {
                        index: record.node_index(index, node_count)?,
                        barrier_height: record.float(height, "barrier height")?,
                        supercritical_flow_coefficient: record
                            .float(supercritical, "supercritical flow coefficient")?,
                    })
                })?;

                BoundarySegment::Outflow(OutflowBoundary { ibtype, nodes })
            }
            BoundaryKind::Weir => {
                let pairs = self.read_rows(nvell, |record| {
                    let [front, back, height, subcritical, supercritical] = record.fields::<5>()?;
                    Ok(WeirPair {
                        front_face_index: record.node_index(front, node_count)?,
                        back_face_index: record.node_index(back, node_count)?,
                        barrier_height: record.float(height, "barrier height")?,
                        subcritical_flow_coefficient: record
                            .float(subcritical, "subcritical flow coefficient")?,
                        supercritical_flow_coefficient: record
                            .float(supercritical, "supercritical flow coefficient")?,
                    })
                })?;

                BoundarySegment::Weir(WeirBoundary { ibtype, pairs })
            }
            BoundaryKind::Culvert => {
                let pairs = self.read_rows(nvell, |record| {
                    let [front, back, height, subcritical, supercritical, friction, diameter] =
                        record.fields::<7>()?;
                    Ok(CulvertPair {
                        front_face_index: record.node_index(front, node_count)?,
                        back_face_index: record.node_index(back, node_count)?,
                        barrier_height: record.float(height, "barrier height")?,
                        subcritical_flow_coefficient: record
                            .float(subcritical, "subcritical flow coefficient")?,
                        supercritical_flow_coefficient: record
                            .float(supercritical, "supercritical flow coefficient")?,
                        friction_factor: record.float(friction, "friction factor")?,
                        pipe_diameter: record.float(diameter, "pipe diameter")?,
                    })
                })?;

                BoundarySegment::Culvert(CulvertBoundary { ibtype, pairs })
            }
        };

        Ok(segment)
    }

    fn read_rows<T>(
        &mut self,
        count: usize,
        parse_row: impl Fn(&Record) -> Result<T, ParseError>,
    ) -> Result<Vec<T>, ParseError> {
        let mut rows = Vec::with_capacity(count.min(PREALLOCATE_LIMIT));

        for i in 0..count {
            let record = self.next_record(Section::OtherBoundaries, count - i)?;
            rows.push(parse_row(&record)?);
        }

        Ok(rows)
    }
}

/// Parses a fort.14 mesh file
///
/// # Arguments
/// * `path` - The path to the mesh file
///
/// # Returns
/// The parsed Mesh
pub fn parse_mesh<P: AsRef<Path>>(path: P) -> Result<Mesh, ParseError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ParseError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    Fort14Parser::new(BufReader::new(file)).parse()
}

impl FromStr for Mesh {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Fort14Parser::new(s.as_bytes()).parse()
    }
}
