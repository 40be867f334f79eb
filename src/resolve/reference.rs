//! Structured `<reference>` data.
//!
//! Parses the RFC 7991 `<reference>` element embedded in a document and
//! formats it as a bibliography entry.

use quick_xml::Reader;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A parsed `<reference>` element.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reference {
    pub anchor: String,
    pub target: Option<String>,
    pub front: Front,
    pub format: Option<Format>,
    pub series: Vec<SeriesInfo>,
    pub ref_content: Option<String>,
}

/// The `<front>` of a reference.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Front {
    pub title: String,
    pub authors: Vec<Author>,
    pub date: Option<Date>,
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Author {
    pub fullname: Option<String>,
    pub initials: Option<String>,
    pub surname: Option<String>,
    pub role: Option<String>,
    pub organization: Option<Organization>,
    pub address: Option<Address>,
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Organization {
    pub abbrev: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Address {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub uri: Option<String>,
    /// Postal lines, streets, cities, codes, regions and countries in document order.
    pub postal: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Date {
    pub year: Option<String>,
    pub month: Option<String>,
    pub day: Option<String>,
}

/// Deprecated `<format>` element (RFC 7991, section 3.3).
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Format {
    pub kind: Option<String>,
    pub target: String,
}

/// `<seriesInfo>`: name is "RFC", "Internet-Draft", "DOI", etc.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SeriesInfo {
    pub name: Option<String>,
    pub ascii_name: Option<String>,
    pub value: Option<String>,
    pub ascii_value: Option<String>,
    pub status: Option<String>,
    pub stream: Option<String>,
}

impl Reference {
    /// Parse a single `<reference>` element.
    ///
    /// Anything else at the root (including `<referencegroup>`) and any
    /// XML error is reported as an error.
    pub fn parse(xml: &str) -> Result<Reference> {
        let mut reader = Reader::from_str(xml);

        let mut reference = Reference::default();
        let mut stack: Vec<Vec<u8>> = Vec::new();
        let mut text = String::new();
        let mut complete = false;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    if complete {
                        break;
                    }
                    reference.open(&e, stack.len())?;
                    stack.push(e.local_name().as_ref().to_vec());
                    text.clear();
                }
                Event::Empty(e) => {
                    if complete {
                        break;
                    }
                    reference.open(&e, stack.len())?;
                    text.clear();
                    let name = e.local_name().as_ref().to_vec();
                    reference.close(&name, &stack, "");
                    complete = stack.is_empty();
                }
                Event::Text(t) => {
                    let raw = String::from_utf8_lossy(&t);
                    text.push_str(&unescape(&raw)?);
                }
                Event::CData(t) => text.push_str(&String::from_utf8_lossy(&t)),
                Event::GeneralRef(r) => {
                    let name = String::from_utf8_lossy(&r);
                    match resolve_entity(&name) {
                        Some(resolved) => text.push_str(&resolved),
                        None => {
                            return Err(Error::InvalidReference(format!(
                                "unknown entity &{name};"
                            )));
                        }
                    }
                }
                Event::End(e) => {
                    let name = e.local_name().as_ref().to_vec();
                    stack.pop();
                    let value = collapse(&text);
                    reference.close(&name, &stack, &value);
                    text.clear();
                    if stack.is_empty() {
                        complete = true;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !complete {
            return Err(Error::InvalidReference(
                "unexpected end of <reference>".to_string(),
            ));
        }
        Ok(reference)
    }

    fn open(&mut self, e: &BytesStart<'_>, depth: usize) -> Result<()> {
        let name = e.local_name();
        let name = name.as_ref();

        if depth == 0 {
            if name != b"reference" {
                return Err(Error::InvalidReference(format!(
                    "expected <reference>, found <{}>",
                    String::from_utf8_lossy(name)
                )));
            }
            for (key, value) in attributes(e)? {
                match key.as_slice() {
                    b"anchor" => self.anchor = value,
                    b"target" => self.target = Some(value),
                    _ => {}
                }
            }
            return Ok(());
        }

        match name {
            b"author" => {
                let mut author = Author::default();
                for (key, value) in attributes(e)? {
                    match key.as_slice() {
                        b"fullname" => author.fullname = Some(value),
                        b"initials" => author.initials = Some(value),
                        b"surname" => author.surname = Some(value),
                        b"role" => author.role = Some(value),
                        _ => {}
                    }
                }
                self.front.authors.push(author);
            }
            b"organization" => {
                let mut org = Organization::default();
                for (key, value) in attributes(e)? {
                    if key == b"abbrev" {
                        org.abbrev = Some(value);
                    }
                }
                if let Some(author) = self.front.authors.last_mut() {
                    author.organization = Some(org);
                }
            }
            b"address" => {
                if let Some(author) = self.front.authors.last_mut() {
                    author.address = Some(Address::default());
                }
            }
            b"date" => {
                let mut date = Date::default();
                for (key, value) in attributes(e)? {
                    match key.as_slice() {
                        b"year" => date.year = Some(value),
                        b"month" => date.month = Some(value),
                        b"day" => date.day = Some(value),
                        _ => {}
                    }
                }
                self.front.date = Some(date);
            }
            b"format" => {
                let mut format = Format::default();
                for (key, value) in attributes(e)? {
                    match key.as_slice() {
                        b"type" => format.kind = Some(value),
                        b"target" => format.target = value,
                        _ => {}
                    }
                }
                self.format = Some(format);
            }
            b"seriesInfo" => {
                let mut series = SeriesInfo::default();
                for (key, value) in attributes(e)? {
                    match key.as_slice() {
                        b"name" => series.name = Some(value),
                        b"asciiName" => series.ascii_name = Some(value),
                        b"value" => series.value = Some(value),
                        b"asciiValue" => series.ascii_value = Some(value),
                        b"status" => series.status = Some(value),
                        b"stream" => series.stream = Some(value),
                        _ => {}
                    }
                }
                self.series.push(series);
            }
            _ => {}
        }
        Ok(())
    }

    /// Store the text of a closed element. `stack` holds its ancestors.
    fn close(&mut self, name: &[u8], stack: &[Vec<u8>], text: &str) {
        let parent = stack.last().map(Vec::as_slice);
        match (parent, name) {
            (Some(b"front"), b"title") => self.front.title = text.to_string(),
            (Some(b"reference"), b"refcontent") if !text.is_empty() => {
                self.ref_content = Some(text.to_string())
            }
            (_, b"organization") => {
                if let Some(org) = self
                    .front
                    .authors
                    .last_mut()
                    .and_then(|a| a.organization.as_mut())
                {
                    org.name = text.to_string();
                }
            }
            (_, b"phone" | b"email" | b"uri") if !text.is_empty() => {
                if let Some(address) = self
                    .front
                    .authors
                    .last_mut()
                    .and_then(|a| a.address.as_mut())
                {
                    let value = Some(text.to_string());
                    match name {
                        b"phone" => address.phone = value,
                        b"email" => address.email = value,
                        _ => address.uri = value,
                    }
                }
            }
            (_, b"postalLine" | b"street" | b"city" | b"code" | b"region" | b"country")
                if !text.is_empty() =>
            {
                if let Some(address) = self
                    .front
                    .authors
                    .last_mut()
                    .and_then(|a| a.address.as_mut())
                {
                    address.postal.push(text.to_string());
                }
            }
            _ => {}
        }
    }

    /// Format as a bibliography entry, e.g.
    /// `Bradner, S., "Key words ...", BCP 14, RFC 2119, March 1997, <https://...>.`
    pub fn citation_text(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        let authors: Vec<String> = self.front.authors.iter().filter_map(Author::display).collect();
        if !authors.is_empty() {
            parts.push(join_authors(&authors));
        }
        if !self.front.title.is_empty() {
            parts.push(format!("\"{}\"", self.front.title));
        }
        for series in &self.series {
            let label = [series.name.as_deref(), series.value.as_deref()]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" ");
            if !label.is_empty() {
                parts.push(label);
            }
        }
        if let Some(content) = &self.ref_content {
            parts.push(content.clone());
        }
        if let Some(date) = self.front.date.as_ref().and_then(Date::display) {
            parts.push(date);
        }
        let target = self
            .target
            .as_deref()
            .or(self.format.as_ref().map(|f| f.target.as_str()))
            .filter(|t| !t.is_empty());
        if let Some(target) = target {
            parts.push(format!("<{target}>"));
        }

        let mut text = parts.join(", ");
        if !text.is_empty() {
            text.push('.');
        }
        text
    }
}

impl Author {
    /// `Surname, I.` when structured names are present, otherwise the
    /// full name or the organization.
    fn display(&self) -> Option<String> {
        let mut name = match (&self.surname, &self.initials, &self.fullname) {
            (Some(surname), Some(initials), _) => format!("{surname}, {initials}"),
            (Some(surname), None, _) => surname.clone(),
            (None, _, Some(fullname)) => fullname.clone(),
            _ => self
                .organization
                .as_ref()
                .map(|o| o.name.clone())
                .filter(|n| !n.is_empty())?,
        };
        if self.role.as_deref() == Some("editor") {
            name.push_str(", Ed.");
        }
        Some(name)
    }
}

impl Date {
    fn display(&self) -> Option<String> {
        let parts: Vec<&str> = [self.day.as_deref(), self.month.as_deref(), self.year.as_deref()]
            .into_iter()
            .flatten()
            .filter(|p| !p.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

fn join_authors(authors: &[String]) -> String {
    match authors {
        [] => String::new(),
        [one] => one.clone(),
        [first, second] => format!("{first} and {second}"),
        [rest @ .., last] => format!("{}, and {last}", rest.join(", ")),
    }
}

fn attributes(e: &BytesStart<'_>) -> Result<Vec<(Vec<u8>, String)>> {
    let mut out = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        let raw = String::from_utf8_lossy(&attr.value);
        out.push((
            attr.key.local_name().as_ref().to_vec(),
            unescape(&raw)?.into_owned(),
        ));
    }
    Ok(out)
}

fn resolve_entity(name: &str) -> Option<String> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }
    resolve_predefined_entity(name).map(str::to_string)
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
