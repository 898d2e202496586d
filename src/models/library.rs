//! Model cards shipped with the crate.

/// Built-in model library.
///
/// The 1N4148 card matches [`DiodeParams::d1n4148`](crate::devices::DiodeParams::d1n4148).
/// The JFET cards carry the device ohmic resistances (RD, RS) but no
/// external circuit.
pub const BUILTIN_MODELS: &str = "\
* Small-signal silicon diodes
.model 1N4148 D(IS=4.352n N=1.906 RS=0.6458 CJO=0.7048p VJ=0.869 M=0.03
+               TT=3.48n)
.model 1N914 D(IS=2.52n RS=.568 N=1.752 CJO=4p M=.4 TT=20n)

* N-channel JFETs
.model J201 NJF(Beta=1.304m Rd=1 Rs=1 Lambda=2.8m Vto=-.8)
.model 2N5457 NJF(Beta=1.125m Rd=1 Rs=1 Lambda=2.3m Vto=-1.372)
";
