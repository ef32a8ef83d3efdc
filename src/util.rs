use std::fmt;

use crate::proto::{Opcode, FINAL_BIT};

/// Human-readable request opcode for log lines, e.g. `Put|final`.
pub fn display_opcode(opcode: u8) -> impl fmt::Display {
    struct Packet(u8);

    impl fmt::Display for Packet {
        fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
            let Packet(opcode) = *self;
            match Opcode::try_from(opcode & !FINAL_BIT) {
                Ok(known) => write!(fmt, "{:?}", known)?,
                Err(_) => write!(fmt, "0x{:02x}", opcode & !FINAL_BIT)?,
            }

            if opcode & FINAL_BIT != 0 {
                fmt.write_str("|final")?;
            }

            Ok(())
        }
    }

    Packet(opcode)
}

pub fn display_or<'a, T: fmt::Display + 'a>(
    maybe: Option<T>,
    placeholder: &'a str,
) -> impl fmt::Display + 'a {
    struct Or<'a, T>(Option<T>, &'a str);

    impl<T: fmt::Display> fmt::Display for Or<'_, T> {
        fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
            match &self.0 {
                Some(value) => value.fmt(fmt),
                None => fmt.write_str(self.1),
            }
        }
    }

    Or(maybe, placeholder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcodes_show_final_marker() {
        assert_eq!(display_opcode(0x82).to_string(), "Put|final");
        assert_eq!(display_opcode(0x03).to_string(), "Get");
        assert_eq!(display_opcode(0x7f | FINAL_BIT).to_string(), "Abort|final");
        assert_eq!(display_opcode(0x10).to_string(), "0x10");
    }

    #[test]
    fn falls_back_to_placeholder() {
        assert_eq!(display_or(Some(10), "none").to_string(), "10");
        assert_eq!(display_or(None::<u32>, "none").to_string(), "none");
    }
}
