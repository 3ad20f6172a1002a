//! Silicon identification from the `PSS_IDCODE` and devcfg `MCTRL` registers.
use core::fmt;

use zynq7000::{
    devcfg::{MCTRL_ADDR, MiscControl, PsVersion},
    slcr::{IdCode, PSS_IDCODE_ADDR, XILINX_MANUFACTURER_ID},
};

use super::read_reg;

/// Device codes of the `PSS_IDCODE` register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, num_enum::TryFromPrimitive)]
#[repr(u8)]
pub enum DeviceCode {
    Z7007s = 0x03,
    Z7010 = 0x02,
    Z7012s = 0x1C,
    Z7014s = 0x08,
    Z7015 = 0x1B,
    Z7020 = 0x07,
    Z7030 = 0x0C,
    Z7035 = 0x12,
    Z7045 = 0x11,
    Z7100 = 0x16,
}

impl DeviceCode {
    pub const fn part_name(&self) -> &'static str {
        match self {
            DeviceCode::Z7007s => "7z007s",
            DeviceCode::Z7010 => "7z010",
            DeviceCode::Z7012s => "7z012s",
            DeviceCode::Z7014s => "7z014s",
            DeviceCode::Z7015 => "7z015",
            DeviceCode::Z7020 => "7z020",
            DeviceCode::Z7030 => "7z030",
            DeviceCode::Z7035 => "7z035",
            DeviceCode::Z7045 => "7z045",
            DeviceCode::Z7100 => "7z100",
        }
    }
}

impl fmt::Display for DeviceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.part_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SanityCheckError {
    #[error("unexpected manufacturer ID {0:#x}")]
    ManufacturerId(u16),
    #[error("unknown device code {0:#x}")]
    DeviceCode(u8),
}

/// PS version from the raw `MCTRL` register value.
#[inline]
pub fn ps_version_from_mctrl(mctrl: u32) -> PsVersion {
    MiscControl::new_with_raw_value(mctrl).ps_version()
}

/// Manufacturer ID from the raw `PSS_IDCODE` register value.
#[inline]
pub fn mfr_id_from_idcode(idcode: u32) -> u16 {
    IdCode::new_with_raw_value(idcode).manufacturer_id().value()
}

/// Device code from the raw `PSS_IDCODE` register value.
#[inline]
pub fn device_code_from_idcode(idcode: u32) -> u8 {
    IdCode::new_with_raw_value(idcode).device_code().value()
}

/// Silicon revision of the processing system.
pub fn ps_version() -> PsVersion {
    ps_version_from_mctrl(read_reg(MCTRL_ADDR))
}

/// Manufacturer ID, which is always 0x49 for Xilinx.
pub fn mfr_id() -> u16 {
    mfr_id_from_idcode(read_reg(PSS_IDCODE_ADDR))
}

pub fn device_code() -> u8 {
    device_code_from_idcode(read_reg(PSS_IDCODE_ADDR))
}

/// Decoded silicon identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiliconInfo {
    pub ps_version: PsVersion,
    pub mfr_id: u16,
    pub device_code: DeviceCode,
}

impl SiliconInfo {
    /// Verify and decode raw register values.
    pub fn from_raw(mctrl: u32, idcode: u32) -> Result<Self, SanityCheckError> {
        let mfr_id = mfr_id_from_idcode(idcode);
        if mfr_id != XILINX_MANUFACTURER_ID {
            return Err(SanityCheckError::ManufacturerId(mfr_id));
        }
        let raw_code = device_code_from_idcode(idcode);
        let device_code =
            DeviceCode::try_from(raw_code).map_err(|_| SanityCheckError::DeviceCode(raw_code))?;
        Ok(Self {
            ps_version: ps_version_from_mctrl(mctrl),
            mfr_id,
            device_code,
        })
    }
}

impl fmt::Display for SiliconInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<20}{}", "PS Version:", self.ps_version)?;
        writeln!(f, "{:<20}0x{:08x}", "Mfr ID:", self.mfr_id)?;
        write!(
            f,
            "{:<20}0x{:08x} ({})",
            "Device Code:", self.device_code as u8, self.device_code
        )
    }
}

/// Check the manufacturer ID and the device code and return the decoded silicon information.
pub fn sanity_check() -> Result<SiliconInfo, SanityCheckError> {
    SiliconInfo::from_raw(read_reg(MCTRL_ADDR), read_reg(PSS_IDCODE_ADDR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;

    // IDCODE of a XC7Z020 and MCTRL of a silicon revision 3.1 part.
    const IDCODE_7Z020: u32 = 0x0372_7093;
    const MCTRL_V3_1: u32 = 0x3000_0800;

    #[test]
    fn idcode_decoding() {
        assert_eq!(mfr_id_from_idcode(IDCODE_7Z020), 0x49);
        assert_eq!(device_code_from_idcode(IDCODE_7Z020), 0x07);
        assert_eq!(device_code_from_idcode(0x0372_2093), 0x02);
        assert_eq!(mfr_id_from_idcode(0x0000_0FFE), 0x7FF);
    }

    #[test]
    fn ps_version_decoding() {
        assert_eq!(ps_version_from_mctrl(0), PsVersion::V1_0);
        assert_eq!(ps_version_from_mctrl(0x1000_0000), PsVersion::V2_0);
        assert_eq!(ps_version_from_mctrl(0x2FFF_FFFF), PsVersion::V3_0);
        assert_eq!(ps_version_from_mctrl(MCTRL_V3_1), PsVersion::V3_1);
        assert_eq!(ps_version_from_mctrl(0xA000_0000), PsVersion::Unknown(0xA));
    }

    #[test]
    fn device_codes() {
        for (raw, part) in [
            (0x02, "7z010"),
            (0x1B, "7z015"),
            (0x07, "7z020"),
            (0x0C, "7z030"),
            (0x11, "7z045"),
            (0x03, "7z007s"),
            (0x16, "7z100"),
        ] {
            assert_eq!(DeviceCode::try_from(raw).unwrap().part_name(), part);
        }
        assert!(DeviceCode::try_from(0x1F).is_err());
    }

    #[test]
    fn sanity_check_results() {
        let info = SiliconInfo::from_raw(MCTRL_V3_1, IDCODE_7Z020).unwrap();
        assert_eq!(info.device_code, DeviceCode::Z7020);
        assert_eq!(info.ps_version, PsVersion::V3_1);
        assert_eq!(
            SiliconInfo::from_raw(MCTRL_V3_1, 0x0372_7001),
            Err(SanityCheckError::ManufacturerId(0))
        );
        assert_eq!(
            SiliconInfo::from_raw(MCTRL_V3_1, 0x0373_F093),
            Err(SanityCheckError::DeviceCode(0x1F))
        );
    }

    #[test]
    fn silicon_info_display() {
        let info = SiliconInfo::from_raw(MCTRL_V3_1, IDCODE_7Z020).unwrap();
        let mut out = heapless::String::<128>::new();
        write!(out, "{info}").unwrap();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("PS Version:         3.1"));
        assert_eq!(lines.next(), Some("Mfr ID:             0x00000049"));
        assert_eq!(lines.next(), Some("Device Code:        0x00000007 (7z020)"));
    }
}
