use anyhow::{bail, ensure, Result};
use itertools::Itertools;
use std::io::Write;

pub const DEFAULT_BYTE_FORMAT: &str = "0x%X, ";
pub const BYTES_PER_LINE: usize = 16;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Conversion {
    UpperHex,
    LowerHex,
    Decimal,
    Octal,
    Binary,
}

/// A printf-style template with exactly one conversion for the byte value,
/// e.g. `0x%02X, ` or `%d,`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ByteFormat {
    prefix: String,
    suffix: String,
    conversion: Conversion,
    zero_pad: bool,
    width: usize,
}

impl ByteFormat {
    pub fn parse(template: &str) -> Result<Self> {
        let mut prefix = String::new();
        let mut suffix = String::new();
        let mut found: Option<(Conversion, bool, usize)> = None;
        let mut chars = template.chars().peekable();
        while let Some(c) = chars.next() {
            let text = if found.is_some() { &mut suffix } else { &mut prefix };
            if c != '%' {
                text.push(c);
                continue;
            }
            if chars.peek() == Some(&'%') {
                chars.next();
                text.push('%');
                continue;
            }
            ensure!(
                found.is_none(),
                "format {:?} has more than one conversion",
                template
            );
            let mut zero_pad = chars.next_if_eq(&'0').is_some();
            let digits: String = chars.peeking_take_while(|c| c.is_ascii_digit()).collect();
            let mut width = if digits.is_empty() { 0 } else { digits.parse()? };
            let conversion = match chars.next() {
                Some('X') => Conversion::UpperHex,
                Some('x') => Conversion::LowerHex,
                Some('d') | Some('u') => Conversion::Decimal,
                Some('o') => Conversion::Octal,
                Some('b') => Conversion::Binary,
                Some(other) => bail!("unsupported conversion %{} in format {:?}", other, template),
                None => bail!("format {:?} ends in the middle of a conversion", template),
            };
            // Hex without an explicit width prints two digits per byte.
            if digits.is_empty()
                && matches!(conversion, Conversion::UpperHex | Conversion::LowerHex)
            {
                zero_pad = true;
                width = 2;
            }
            found = Some((conversion, zero_pad, width));
        }
        let Some((conversion, zero_pad, width)) = found else {
            bail!("format {:?} has no conversion for the byte value", template);
        };
        Ok(ByteFormat {
            prefix,
            suffix,
            conversion,
            zero_pad,
            width,
        })
    }

    pub fn render(&self, byte: u8) -> String {
        let digits = match self.conversion {
            Conversion::UpperHex => format!("{:X}", byte),
            Conversion::LowerHex => format!("{:x}", byte),
            Conversion::Decimal => format!("{}", byte),
            Conversion::Octal => format!("{:o}", byte),
            Conversion::Binary => format!("{:b}", byte),
        };
        let pad = if self.zero_pad { '0' } else { ' ' };
        let padding = std::iter::repeat(pad)
            .take(self.width.saturating_sub(digits.len()))
            .collect::<String>();
        format!("{}{}{}{}", self.prefix, padding, digits, self.suffix)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Raw,
    Listing(ByteFormat),
}

pub fn write_output<W: Write>(out: &mut W, data: &[u8], format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Raw => out.write_all(data)?,
        OutputFormat::Listing(byte_format) => write_listing(out, data, byte_format)?,
    }
    out.flush()?;
    Ok(())
}

/// One template rendering per byte, a line break after every 16 bytes,
/// and a final newline.
pub fn write_listing<W: Write>(out: &mut W, data: &[u8], format: &ByteFormat) -> Result<()> {
    let lines = data
        .chunks(BYTES_PER_LINE)
        .map(|line| line.iter().map(|&b| format.render(b)).join(""))
        .join("\n");
    writeln!(out, "{}", lines)?;
    Ok(())
}
