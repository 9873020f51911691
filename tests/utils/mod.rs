//! Shared fixtures for the integration tests

use std::fs;
use std::path::{Path, PathBuf};

use burden_report::AnalysisConfig;
use tempfile::TempDir;

/// HIV file: quoted single-column rows, one per country and year
pub const HIV_FIXTURE: &str = "\u{feff}\"Country,WHO Region,Year,Count\"
\"Kenya,Africa,2010,1400 thousand\"
\"Kenya,Africa,2018,1600 thousand\"
\"Nigeria,Africa,2018,1900 thousand\"
\"Uganda,Africa,2018,1400 thousand\"
\"Malawi,Africa,2018,1000 thousand\"
\"Zambia,Africa,2018,1200 thousand\"
\"Brazil,Americas,2018,900 thousand\"
\"Haiti,Americas,2018,150 thousand\"
\"Peru,Americas,2018,79 thousand\"
\"Bolivia,Americas,2018,22 thousand\"
\"Chile,Americas,2018,<1 thousand\"
\"Albania,Europe,2018,No data\"
\"Iceland,Europe,2018,1 thousand\"
\"Atlantis,Europe,1890,5 thousand\"
";

/// Poverty sheet exported to CSV: two title rows, then the published header
pub const POVERTY_FIXTURE: &str = "\
Multidimensional Poverty Measure (MPM),,,,,,,,,,,,,,,
,,,,,,,,,,,,,,,
Region,Country code,Economy,Reporting year,Survey name,Survey year,Survey coverage,Welfare type,Survey comparability,Deprivation rate (share of population),Unnamed: 10,Unnamed: 11,Unnamed: 12,Unnamed: 13,Unnamed: 14,Multidimensional poverty headcount ratio (%)
SSF,KEN,Kenya,2015,KIHBS,2015,N,Consumption,1,36.1,-,5.0,58.0,70.1,40.2,51.0
SSF,KEN,Kenya,2021,KCHS,2021,N,Consumption,1,33.0,15.1,4.2,42.3,65.0,35.0,45.2
SSF,NGA,Nigeria,2018,NLSS,2018,N,Consumption,1,30.9,23.7,17.1,40.0,48.9,30.7,47.2
SSF,UGA,Uganda,2019,UNHS,2019,N,Consumption,1,42.1,19.7,7.4,55.1,72.3,31.5,57.2
SSF,MWI,Malawi,2019,IHS,2019,N,Consumption,1,70.1,20.1,6.9,85.8,79.2,12.7,75.2
SSF,ZMB,Zambia,2022,LCMS,2022,N,Consumption,1,64.3,9.8,7.9,59.6,67.1,30.0,67.3
SSF,GHA,Ghana,2016,GLSS,2016,N,Consumption,1,25.2,17.9,8.0,18.9,86.3,11.5,27.7
LCN,BRA,Brazil,2021,PNADC,2021,N,Income,1,5.8,11.2,1.5,0.1,38.2,2.1,5.9
LCN,HTI,Haiti,2012,ECVMAS,2012,N,Consumption,1,29.2,29.6,8.3,61.5,75.1,34.0,49.1
LCN,PER,Peru,2021,ENAHO,2021,N,Income,1,3.0,12.0,n.a.,4.1,22.1,10.9,5.4
LCN,BOL,Bolivia,2021,EH,2021,N,Income,1,2.0,9.1,2.3,6.1,17.4,5.9,3.2
LCN,XXX,,2021,EH,2021,N,Income,1,2.0,9.1,2.3,6.1,17.4,5.9,3.2
,,,,,,,,,,,,,,,
";

/// Mortality file with UNICEF-style headers
pub const MORTALITY_FIXTURE: &str = "\
REF_AREA,Geographic area,Indicator,Sex,TIME_PERIOD,OBS_VALUE,OBS_STATUS
KEN,Kenya,Under-five mortality rate,Total,2019,43.2,Included in IGME
KEN,Kenya,Under-five mortality rate,Total,2021,37.0,Included in IGME
KEN,Kenya,Neonatal mortality rate,Total,2021,20.7,Included in IGME
NGA,Nigeria,Under-five mortality rate,Total,2021,110.8,Included in IGME
UGA,Republic of Uganda,Under-five mortality rate,Total,2021,42.0,Included in IGME
BRA,Brazil,Under-five mortality rate,Total,2021,14.4,Excluded from IGME
HTI,Haiti,Infant mortality rate,Total,2021,46.0,Included in IGME
";

/// Countries expected in the global high-burden set, in rank order
pub const EXPECTED_HIGH_BURDEN: [&str; 4] = ["Nigeria", "Kenya", "Uganda", "Zambia"];

/// Write one fixture file into a temporary directory
pub fn write_fixture(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("failed to write fixture");
    path
}

/// A temporary directory holding all three input files
pub struct FixtureDir {
    pub dir: TempDir,
    pub hiv: PathBuf,
    pub poverty: PathBuf,
    pub mortality: PathBuf,
}

impl FixtureDir {
    #[must_use]
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let hiv = write_fixture(dir.path(), "hiv.csv", HIV_FIXTURE);
        let poverty = write_fixture(dir.path(), "mpm.csv", POVERTY_FIXTURE);
        let mortality = write_fixture(dir.path(), "mortality.csv", MORTALITY_FIXTURE);
        Self {
            dir,
            hiv,
            poverty,
            mortality,
        }
    }

    /// Configuration pointing at the fixtures, writing into `out/`
    #[must_use]
    pub fn config(&self, with_mortality: bool) -> AnalysisConfig {
        AnalysisConfig {
            hiv_path: Some(self.hiv.clone()),
            poverty_path: Some(self.poverty.clone()),
            mortality_path: with_mortality.then(|| self.mortality.clone()),
            output_dir: self.dir.path().join("out"),
            ..AnalysisConfig::default()
        }
    }
}
