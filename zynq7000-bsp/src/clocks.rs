//! Clock module.
//!
//! The PLLs and the clock dividers are configured by the first-stage bootloader or the PS7
//! initialization script. This module only reads back the resulting configuration.
use arbitrary_int::Number;
use fugit::HertzU32 as Hertz;
use zynq7000::slcr::{
    ClockControl,
    clocks::{
        ArmClockControl, ClockRatioSelect, DualPeriphClockControl, PllControl, SrcSelArm,
        SrcSelIo,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmClocks {
    ref_clk: Hertz,
    cpu_1x_clk: Hertz,
    cpu_2x_clk: Hertz,
    cpu_3x2x_clk: Hertz,
    cpu_6x4x_clk: Hertz,
}

impl ArmClocks {
    /// Reference clock provided by ARM PLL which is used to calculate all other clock frequencies.
    pub const fn ref_clk(&self) -> Hertz {
        self.ref_clk
    }

    /// Clock of the AMBA peripherals, for example the TTCs.
    pub const fn cpu_1x_clk(&self) -> Hertz {
        self.cpu_1x_clk
    }

    pub const fn cpu_2x_clk(&self) -> Hertz {
        self.cpu_2x_clk
    }

    /// Clock of the CPU private timer and watchdog.
    pub const fn cpu_3x2x_clk(&self) -> Hertz {
        self.cpu_3x2x_clk
    }

    pub const fn cpu_6x4x_clk(&self) -> Hertz {
        self.cpu_6x4x_clk
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clocks {
    ps_clk: Hertz,
    arm_pll_out: Hertz,
    io_pll_out: Hertz,
    ddr_pll_out: Hertz,
    arm: ArmClocks,
    uart_clk: Hertz,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClockModuleId {
    Arm,
    Uart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ClockReadError {
    /// The feedback value for the PLL clock output calculation is zero.
    #[error("PLL feedback divisor is zero")]
    PllFeedbackZero,
    #[error("divisor of the {0:?} clock is zero")]
    DivisorZero(ClockModuleId),
}

/// Raw clock register values required to calculate the clock configuration.
#[derive(Debug, Clone, Copy)]
pub struct ClockRegisters {
    pub arm_pll: PllControl,
    pub io_pll: PllControl,
    pub ddr_pll: PllControl,
    pub arm_clk_ctrl: ArmClockControl,
    pub clk_621: ClockRatioSelect,
    pub uart_clk_ctrl: DualPeriphClockControl,
}

impl ClockRegisters {
    pub fn read() -> Self {
        // Safety: Only reads are performed.
        let clk_regs = unsafe { ClockControl::new_mmio_fixed() };
        Self {
            arm_pll: clk_regs.read_arm_pll(),
            io_pll: clk_regs.read_io_pll(),
            ddr_pll: clk_regs.read_ddr_pll(),
            arm_clk_ctrl: clk_regs.read_arm_clk_ctrl(),
            clk_621: clk_regs.read_clk_621_true().sel(),
            uart_clk_ctrl: clk_regs.read_uart_clk_ctrl(),
        }
    }
}

impl Clocks {
    /// This generates the clock configuration by reading the SLCR clock registers.
    ///
    /// It assumes that the clock already has been configured, for example by a first-stage
    /// bootloader, or the PS7 initialization script.
    pub fn new_from_regs(ps_clk_freq: Hertz) -> Result<Self, ClockReadError> {
        Self::calculate(ps_clk_freq, &ClockRegisters::read())
    }

    pub fn calculate(ps_clk_freq: Hertz, regs: &ClockRegisters) -> Result<Self, ClockReadError> {
        if regs.arm_pll.fdiv().as_u32() == 0
            || regs.io_pll.fdiv().as_u32() == 0
            || regs.ddr_pll.fdiv().as_u32() == 0
        {
            return Err(ClockReadError::PllFeedbackZero);
        }
        let arm_pll_out = ps_clk_freq * regs.arm_pll.fdiv().as_u32();
        let io_pll_out = ps_clk_freq * regs.io_pll.fdiv().as_u32();
        let ddr_pll_out = ps_clk_freq * regs.ddr_pll.fdiv().as_u32();

        let arm_base_clk = match regs.arm_clk_ctrl.srcsel() {
            SrcSelArm::ArmPll | SrcSelArm::ArmPllAlt => arm_pll_out,
            SrcSelArm::DdrPll => ddr_pll_out,
            SrcSelArm::IoPll => io_pll_out,
        };
        if regs.arm_clk_ctrl.divisor().as_u32() == 0 {
            return Err(ClockReadError::DivisorZero(ClockModuleId::Arm));
        }
        let arm_clk_divided = arm_base_clk / regs.arm_clk_ctrl.divisor().as_u32();
        let arm = match regs.clk_621 {
            ClockRatioSelect::FourToTwoToOne => ArmClocks {
                ref_clk: arm_pll_out,
                cpu_1x_clk: arm_clk_divided / 4,
                cpu_2x_clk: arm_clk_divided / 2,
                cpu_3x2x_clk: arm_clk_divided / 2,
                cpu_6x4x_clk: arm_clk_divided,
            },
            ClockRatioSelect::SixToTwoToOne => ArmClocks {
                ref_clk: arm_pll_out,
                cpu_1x_clk: arm_clk_divided / 6,
                cpu_2x_clk: arm_clk_divided / 3,
                cpu_3x2x_clk: arm_clk_divided / 2,
                cpu_6x4x_clk: arm_clk_divided,
            },
        };

        let uart_base_clk = match regs.uart_clk_ctrl.srcsel() {
            SrcSelIo::IoPll | SrcSelIo::IoPllAlt => io_pll_out,
            SrcSelIo::ArmPll => arm_pll_out,
            SrcSelIo::DdrPll => ddr_pll_out,
        };
        if regs.uart_clk_ctrl.divisor().as_u32() == 0 {
            return Err(ClockReadError::DivisorZero(ClockModuleId::Uart));
        }
        let uart_clk = uart_base_clk / regs.uart_clk_ctrl.divisor().as_u32();

        Ok(Self {
            ps_clk: ps_clk_freq,
            arm_pll_out,
            io_pll_out,
            ddr_pll_out,
            arm,
            uart_clk,
        })
    }

    /// Processing system clock, which is generally dependent on the board and the used crystal.
    pub fn ps_clk(&self) -> Hertz {
        self.ps_clk
    }

    pub fn arm_pll_out(&self) -> Hertz {
        self.arm_pll_out
    }

    pub fn io_pll_out(&self) -> Hertz {
        self.io_pll_out
    }

    pub fn ddr_pll_out(&self) -> Hertz {
        self.ddr_pll_out
    }

    pub fn arm_clocks(&self) -> &ArmClocks {
        &self.arm
    }

    /// UART reference clock.
    pub fn uart_clk(&self) -> Hertz {
        self.uart_clk
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbitrary_int::{u6, u7};

    fn pll(fdiv: u8) -> PllControl {
        PllControl::builder()
            .with_fdiv(u7::new(fdiv))
            .with_bypass_force(false)
            .with_pwrdwn(false)
            .with_reset(false)
            .build()
    }

    // Zedboard configuration: ARM PLL 1333 MHz, IO PLL 1000 MHz, DDR PLL 1067 MHz.
    fn zedboard_regs() -> ClockRegisters {
        ClockRegisters {
            arm_pll: pll(40),
            io_pll: pll(30),
            ddr_pll: pll(32),
            arm_clk_ctrl: ArmClockControl::builder()
                .with_cpu_peri_clk_act(true)
                .with_cpu_1x_clk_act(true)
                .with_cpu_2x_clk_act(true)
                .with_cpu_3or2x_clk_act(true)
                .with_cpu_6or4x_clk_act(true)
                .with_divisor(u6::new(2))
                .with_srcsel(SrcSelArm::ArmPll)
                .build(),
            clk_621: ClockRatioSelect::SixToTwoToOne,
            uart_clk_ctrl: DualPeriphClockControl::builder()
                .with_divisor(u6::new(20))
                .with_srcsel(SrcSelIo::IoPll)
                .with_clk_1_act(true)
                .with_clk_0_act(true)
                .build(),
        }
    }

    #[test]
    fn zedboard_clocks() {
        let clocks = Clocks::calculate(Hertz::from_raw(33_333_333), &zedboard_regs()).unwrap();
        assert_eq!(clocks.arm_pll_out().raw(), 1_333_333_320);
        assert_eq!(clocks.io_pll_out().raw(), 999_999_990);
        let arm = clocks.arm_clocks();
        assert_eq!(arm.cpu_6x4x_clk().raw(), 666_666_660);
        assert_eq!(arm.cpu_3x2x_clk().raw(), 333_333_330);
        assert_eq!(arm.cpu_1x_clk().raw(), 111_111_110);
        assert_eq!(clocks.uart_clk().raw(), 49_999_999);
    }

    #[test]
    fn four_to_two_to_one_ratio() {
        let mut regs = zedboard_regs();
        regs.clk_621 = ClockRatioSelect::FourToTwoToOne;
        let clocks = Clocks::calculate(Hertz::from_raw(33_333_333), &regs).unwrap();
        let arm = clocks.arm_clocks();
        assert_eq!(arm.cpu_2x_clk(), arm.cpu_3x2x_clk());
        assert_eq!(arm.cpu_1x_clk().raw(), 666_666_660 / 4);
    }

    #[test]
    fn zero_feedback_divisor_is_rejected() {
        let mut regs = zedboard_regs();
        regs.io_pll = pll(0);
        assert_eq!(
            Clocks::calculate(Hertz::from_raw(33_333_333), &regs),
            Err(ClockReadError::PllFeedbackZero)
        );
    }

    #[test]
    fn zero_uart_divisor_is_rejected() {
        let mut regs = zedboard_regs();
        regs.uart_clk_ctrl = DualPeriphClockControl::new_with_raw_value(0);
        assert_eq!(
            Clocks::calculate(Hertz::from_raw(33_333_333), &regs),
            Err(ClockReadError::DivisorZero(ClockModuleId::Uart))
        );
    }
}
