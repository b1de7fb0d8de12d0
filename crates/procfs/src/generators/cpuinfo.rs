//! `/proc/cpuinfo` 生成器
//!
//! 由三组 CPU 识别查询拼装：叶 0 的厂商标识、叶 1 的
//! 家族/型号/步进解码、扩展叶 0x8000_0002..=0x8000_0004 的品牌串。

use alloc::vec::Vec;
use core::fmt::Write;

use vfs::FsError;

use crate::ops::proc_ops;
use crate::provider::{ContentGenerator, OutBuf};

/// `/proc/cpuinfo` 内容生成器。
pub struct CpuinfoGenerator;

/// 解码叶 1 的 EAX：返回 (显示家族, 显示型号, 步进, 类型)。
///
/// 扩展家族别名规则：基础家族为 15 时显示家族加上扩展家族、显示型号
/// 加上扩展型号左移 4 位；基础家族为 6 时仅型号加上扩展型号左移 4 位；
/// 其余情况基础值原样显示。
pub(crate) fn decode_family_model(eax: u32) -> (u32, u32, u32, u32) {
    let stepping = eax & 0xf;
    let model = (eax >> 4) & 0xf;
    let family = (eax >> 8) & 0xf;
    let cpu_type = (eax >> 12) & 0x3;
    let extended_model = (eax >> 16) & 0xf;
    let extended_family = (eax >> 20) & 0xff;

    let (display_family, display_model) = if family == 15 {
        (family + extended_family, model + (extended_model << 4))
    } else if family == 6 {
        (family, model + (extended_model << 4))
    } else {
        (family, model)
    };
    (display_family, display_model, stepping, cpu_type)
}

fn emit_reg_bytes(out: &mut OutBuf, value: u32) {
    out.push_bytes(&value.to_le_bytes());
}

impl ContentGenerator for CpuinfoGenerator {
    fn generate(&self) -> Result<Vec<u8>, FsError> {
        let ops = proc_ops();
        let Some(mut out) = OutBuf::with_estimate(256) else {
            return Ok(Vec::new());
        };

        {
            let regs = ops.cpuid(0);
            let _ = out.write_str("cpuid:     ");
            emit_reg_bytes(&mut out, regs.ebx);
            emit_reg_bytes(&mut out, regs.edx);
            emit_reg_bytes(&mut out, regs.ecx);
            let _ = out.write_char('\n');
        }
        {
            let regs = ops.cpuid(1);
            let (family, model, stepping, cpu_type) = decode_family_model(regs.eax);
            let _ = writeln!(out, "family:    {family}");
            let _ = writeln!(out, "model:     {model}");
            let _ = writeln!(out, "stepping:  {stepping}");
            let _ = writeln!(out, "type:      {cpu_type}");
        }
        {
            let mut brand = Vec::with_capacity(48);
            for leaf in 0x8000_0002u32..=0x8000_0004 {
                let regs = ops.cpuid(leaf);
                for value in [regs.eax, regs.ebx, regs.ecx, regs.edx] {
                    brand.extend_from_slice(&value.to_le_bytes());
                }
            }
            let end = brand.iter().position(|&b| b == 0).unwrap_or(brand.len());
            let brand = core::str::from_utf8(&brand[..end]).unwrap_or("");
            let _ = writeln!(out, "brandstr:  \"{brand}\"");
        }

        Ok(out.into_bytes())
    }
}
