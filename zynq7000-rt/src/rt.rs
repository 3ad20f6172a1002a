//! Start-up code of the demonstration programs.
//!
//! The sequence matches the Xilinx standalone
//! [boot.S](https://github.com/Xilinx/embeddedsw/blob/master/lib/bsp/standalone/src/arm/cortexa9/gcc/boot.S),
//! split into small routines:
//!
//! 1. `_start` only lets CPU 0 through. CPU 1 is parked, and held in reset on single core
//!    devices.
//! 2. TLBs, the L1 caches and the branch predictor are invalidated and the MMU is switched off.
//! 3. One stack per processor mode is carved from `_stack_top`, execution continues in system
//!    mode on the remaining stack.
//! 4. The SCU, the MMU with the flat table of [crate::mmu] and the L1 caches are enabled.
//! 5. `zynq_rt_init_l2c` configures and enables the PL310 L2 cache.
//! 6. `zynq_rt_enable_vfp` enables VFP/NEON, branch prediction and prefetching.
//! 7. `.bss` is zeroed, `.data` is copied and `boot_core(0)` is called.
use cortex_a_rt as _;
use cortex_ar::register::cpsr::ProcessorMode;

use crate::boot::*;

core::arch::global_asm!(
    r#"
.macro zynq_rt_mode_stack mode, size
    mrs     r0, cpsr
    bic     r0, r0, #0x1F
    orr     r0, r0, #\mode
    msr     cpsr, r0
    mov     sp, r3
    ldr     r1, =\size
    sub     r3, r3, r1
.endm

.section .text.startup
.align 0

.global _start
.type _start, %function
_start:
    // MPIDR affinity level 0.
    mrc     p15, 0, r0, c0, c0, 5
    ands    r0, r0, #0x3
    bne     zynq_rt_park_core

    ldr     r0, ={efuse_status}
    ldr     r1, [r0]
    tst     r1, #{efuse_cpu1_disabled}
    beq     zynq_rt_cpu0_init
    ldr     r0, ={slcr_unlock}
    ldr     r1, ={unlock_key}
    str     r1, [r0]
    ldr     r0, ={cpu_rst_ctrl}
    ldr     r1, [r0]
    orr     r1, r1, #{cpu1_halt}
    str     r1, [r0]
    ldr     r0, ={slcr_lock}
    ldr     r1, ={lock_key}
    str     r1, [r0]

zynq_rt_cpu0_init:
    ldr     r0, =_vector_table
    mcr     p15, 0, r0, c12, c0, 0      // VBAR
    // Invalidate the SCU tag RAMs of both cores.
    ldr     r0, ={scu_invalidate}
    ldr     r1, =0xFFFF
    str     r1, [r0]
    mov     r0, #0
    mcr     p15, 0, r0, c8, c7, 0       // TLBIALL
    mcr     p15, 0, r0, c7, c5, 0       // ICIALLU
    mcr     p15, 0, r0, c7, c5, 6       // BPIALL
    bl      zynq_rt_invalidate_dcache
    mrc     p15, 0, r0, c1, c0, 0
    bic     r0, r0, #0x1
    mcr     p15, 0, r0, c1, c0, 0

    ldr     r3, =_stack_top
    zynq_rt_mode_stack {irq_mode}, _irq_stack_size
    zynq_rt_mode_stack {svc_mode}, _svc_stack_size
    zynq_rt_mode_stack {abt_mode}, _abt_stack_size
    zynq_rt_mode_stack {fiq_mode}, _fiq_stack_size
    zynq_rt_mode_stack {und_mode}, _und_stack_size
    mrs     r0, cpsr
    bic     r0, r0, #0x1F
    orr     r0, r0, #{sys_mode}
    msr     cpsr, r0
    mov     sp, r3

    ldr     r0, ={scu_control}
    ldr     r1, [r0]
    orr     r1, r1, #0x1
    str     r1, [r0]

    bl      load_mmu_table
    // All domains are managers, the table entries alone define the access permissions.
    mvn     r0, #0
    mcr     p15, 0, r0, c3, c0, 0
    ldr     r0, ={sctlr}
    mcr     p15, 0, r0, c1, c0, 0
    dsb
    isb
    // ACTLR: SMP mode and broadcast of cache and TLB maintenance.
    mrc     p15, 0, r0, c1, c0, 1
    orr     r0, r0, #0x41
    mcr     p15, 0, r0, c1, c0, 1

    bl      zynq_rt_init_l2c
    bl      zynq_rt_enable_vfp
    cpsie   a
    bl      zynq_rt_init_sections

    mov     r0, #0
    bl      boot_core
    b       .
.size _start, . - _start

.type zynq_rt_park_core, %function
zynq_rt_park_core:
    wfe
    b       zynq_rt_park_core
.size zynq_rt_park_core, . - zynq_rt_park_core
    "#,
    efuse_status = const EFUSE_STATUS,
    efuse_cpu1_disabled = const EFUSE_CPU1_DISABLED,
    slcr_unlock = const SLCR_UNLOCK,
    slcr_lock = const SLCR_LOCK,
    unlock_key = const SLCR_UNLOCK_KEY,
    lock_key = const SLCR_LOCK_KEY,
    cpu_rst_ctrl = const SLCR_A9_CPU_RST_CTRL,
    cpu1_halt = const CPU1_HALT,
    scu_invalidate = const SCU_INVALIDATE_ALL,
    scu_control = const SCU_CONTROL,
    sctlr = const SCTLR_MMU_AND_CACHES,
    irq_mode = const masked_mode(ProcessorMode::Irq),
    svc_mode = const masked_mode(ProcessorMode::Svc),
    abt_mode = const masked_mode(ProcessorMode::Abt),
    fiq_mode = const masked_mode(ProcessorMode::Fiq),
    und_mode = const masked_mode(ProcessorMode::Und),
    sys_mode = const masked_mode(ProcessorMode::Sys),
);

// The L2 cache must stay disabled while the latencies are changed.
core::arch::global_asm!(
    r#"
.section .text.zynq_rt_init_l2c
.type zynq_rt_init_l2c, %function
zynq_rt_init_l2c:
    ldr     r0, ={control}
    mov     r1, #0
    str     r1, [r0]
    ldr     r0, ={aux_control}
    ldr     r1, [r0]
    ldr     r2, ={aux_control_value}
    orr     r1, r1, r2
    str     r1, [r0]
    ldr     r0, ={tag_latency}
    ldr     r1, ={tag_latency_value}
    str     r1, [r0]
    ldr     r0, ={data_latency}
    ldr     r1, ={data_latency_value}
    str     r1, [r0]

    ldr     r0, ={invalidate_by_way}
    ldr     r1, ={all_ways}
    str     r1, [r0]
1:
    ldr     r1, [r0]
    cmp     r1, #0
    bne     1b
    ldr     r0, ={raw_int_status}
    ldr     r1, [r0]
    ldr     r0, ={int_clear}
    str     r1, [r0]

    ldr     r0, ={slcr_unlock}
    ldr     r1, ={unlock_key}
    str     r1, [r0]
    ldr     r0, ={slcr_l2c_ram}
    ldr     r1, ={l2c_ram_config}
    str     r1, [r0]
    ldr     r0, ={slcr_lock}
    ldr     r1, ={lock_key}
    str     r1, [r0]

    ldr     r0, ={control}
    ldr     r1, [r0]
    orr     r1, r1, #0x1
    str     r1, [r0]
    bx      lr
.size zynq_rt_init_l2c, . - zynq_rt_init_l2c
    "#,
    control = const L2C_CONTROL,
    aux_control = const L2C_AUX_CONTROL,
    aux_control_value = const L2C_AUX_CONTROL_VALUE,
    tag_latency = const L2C_TAG_RAM_LATENCY,
    tag_latency_value = const L2C_TAG_RAM_LATENCY_VALUE,
    data_latency = const L2C_DATA_RAM_LATENCY,
    data_latency_value = const L2C_DATA_RAM_LATENCY_VALUE,
    invalidate_by_way = const L2C_INVALIDATE_BY_WAY,
    all_ways = const L2C_ALL_WAYS,
    raw_int_status = const L2C_RAW_INT_STATUS,
    int_clear = const L2C_INT_CLEAR,
    slcr_unlock = const SLCR_UNLOCK,
    slcr_lock = const SLCR_LOCK,
    unlock_key = const SLCR_UNLOCK_KEY,
    lock_key = const SLCR_LOCK_KEY,
    slcr_l2c_ram = const SLCR_L2C_RAM,
    l2c_ram_config = const L2C_RAM_CONFIG,
);

core::arch::global_asm!(
    r#"
.section .text.zynq_rt_enable_vfp
.type zynq_rt_enable_vfp, %function
zynq_rt_enable_vfp:
    // CPACR: full access to cp10 and cp11.
    mrc     p15, 0, r0, c1, c0, 2
    orr     r0, r0, #(0xF << 20)
    mcr     p15, 0, r0, c1, c0, 2
    isb
    vmrs    r0, fpexc
    orr     r0, r0, #(1 << 30)
    vmsr    fpexc, r0
    // SCTLR.Z
    mrc     p15, 0, r0, c1, c0, 0
    orr     r0, r0, #(1 << 11)
    mcr     p15, 0, r0, c1, c0, 0
    // ACTLR: L1 data prefetch and L2 prefetch hint.
    mrc     p15, 0, r0, c1, c0, 1
    orr     r0, r0, #0x6
    mcr     p15, 0, r0, c1, c0, 1
    bx      lr
.size zynq_rt_enable_vfp, . - zynq_rt_enable_vfp

.section .text.zynq_rt_init_sections
.type zynq_rt_init_sections, %function
zynq_rt_init_sections:
    ldr     r0, =__sbss
    ldr     r1, =__ebss
    mov     r2, #0
0:
    cmp     r0, r1
    strlo   r2, [r0], #4
    blo     0b
    ldr     r0, =__sdata
    ldr     r1, =__edata
    ldr     r2, =__sidata
1:
    cmp     r0, r1
    ldrlo   r3, [r2], #4
    strlo   r3, [r0], #4
    blo     1b
    bx      lr
.size zynq_rt_init_sections, . - zynq_rt_init_sections
    "#
);

// Invalidate all data and unified caches up to the level of coherency by set/way. This runs
// before any stack exists and clobbers r0-r5, r7 and r9-r11.
core::arch::global_asm!(
    r#"
.section .text.zynq_rt_invalidate_dcache
.type zynq_rt_invalidate_dcache, %function
zynq_rt_invalidate_dcache:
    mrc     p15, 1, r0, c0, c0, 1       // CLIDR
    ands    r3, r0, #0x07000000
    mov     r3, r3, lsr #23             // 2 * level of coherency
    beq     3f
    mov     r10, #0                     // 2 * current level
0:
    add     r2, r10, r10, lsr #1
    mov     r1, r0, lsr r2
    and     r1, r1, #7                  // cache type of the level
    cmp     r1, #2
    blt     2f
    mcr     p15, 2, r10, c0, c0, 0      // CSSELR
    isb
    mrc     p15, 1, r1, c0, c0, 0       // CCSIDR
    and     r2, r1, #7
    add     r2, r2, #4                  // set shift
    ldr     r4, =0x3FF
    ands    r4, r4, r1, lsr #3          // highest way
    clz     r5, r4                      // way shift
    ldr     r7, =0x7FFF
    ands    r7, r7, r1, lsr #13         // highest set
1:
    mov     r9, r4
4:
    orr     r11, r10, r9, lsl r5
    orr     r11, r11, r7, lsl r2
    mcr     p15, 0, r11, c7, c6, 2      // DCISW
    subs    r9, r9, #1
    bge     4b
    subs    r7, r7, #1
    bge     1b
2:
    add     r10, r10, #2
    cmp     r3, r10
    bgt     0b
3:
    mov     r10, #0
    mcr     p15, 2, r10, c0, c0, 0
    dsb
    isb
    bx      lr
.size zynq_rt_invalidate_dcache, . - zynq_rt_invalidate_dcache
    "#
);
