//! Pre-built mock filesystem scenarios for testing.
//!
//! Stat lines use the 11-field layout of Linux 2.6 through 4.17.

use super::filesystem::MockFs;

impl MockFs {
    /// A host with one SATA disk, one partition and an NVMe namespace.
    pub fn typical_host() -> Self {
        let fs = Self::new();
        fs.add_block_device(
            "sda",
            "   18342     5210   912874    23710     9121    14432   601288    80330        0    29810   104040\n",
        );
        fs.add_block_device(
            "sda1",
            "     512        0    10240      120        8        0       64       16        0      130      136\n",
        );
        fs.add_block_device(
            "nvme0n1",
            "  402118        7 21433590    61002   981220   340012 88120344  1023318        2   288104  1084320\n",
        );
        fs
    }

    /// A host whose disk reports a line this layout does not recognize.
    ///
    /// `sda` is healthy, `sdb` carries the 17-field layout of kernels 5.5+,
    /// `sdc` has a truncated line.
    pub fn malformed_host() -> Self {
        let fs = Self::new();
        fs.add_block_device("sda", "100 0 800 50 0 0 0 0 0 5 5\n");
        fs.add_block_device(
            "sdb",
            "100 0 800 50 0 0 0 0 0 5 5 0 0 0 0 0 0\n",
        );
        fs.add_block_device("sdc", "100 0 800 50\n");
        fs
    }
}
