use std::cmp;
use std::fmt::Write;

/// Renders `data` as a canonical hex display (`hexdump -C` style).
///
/// Each line holds the address (with `offset` added), sixteen space-separated two column bytes,
/// and the same bytes as printable characters enclosed in `|`.
pub fn dump_hex(data: &[u8], offset: u64) -> String {
    let mut out = String::new();
    let mut address = 0;

    while address < data.len() {
        let end = cmp::min(address + 16, data.len());
        write_line(&mut out, &data[address..end], address as u64 + offset);
        address += 16;
    }

    out
}

fn write_line(out: &mut String, line: &[u8], address: u64) {
    // Writing into a `String` cannot fail.
    let _ = write!(out, "{:08x}:", address);

    for b in line {
        let _ = write!(out, " {:02x}", b);
    }

    // align the character column for short lines
    for _ in line.len()..16 {
        out.push_str("   ");
    }

    out.push_str("  |");
    for &c in line {
        if c.is_ascii_graphic() || c == b' ' {
            out.push(c as char);
        } else {
            out.push('.');
        }
    }
    out.push_str("|\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dumps_short_line_with_padding() {
        let out = dump_hex(b"AB\x00", 0x10);
        let expected = format!("00000010: 41 42 00{}  |AB.|\n", " ".repeat(13 * 3));
        assert_eq!(out, expected);
    }

    #[test]
    fn test_dumps_multiple_lines() {
        let data: Vec<u8> = (0x30..0x30 + 17).collect();
        let out = dump_hex(&data, 0);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("00000000: 30 31"));
        assert!(lines[0].ends_with("|0123456789:;<=>?|"));
        assert!(lines[1].starts_with("00000010: 40 "));
    }

    #[test]
    fn test_empty_input_renders_nothing() {
        assert_eq!(dump_hex(&[], 0), "");
    }

    #[test]
    fn test_addresses_past_32_bits() {
        let out = dump_hex(b"x", 0x1_0000_0000);
        assert!(out.starts_with("100000000: 78"));
    }
}
