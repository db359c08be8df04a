//! Shared export fixtures for unit tests

use std::path::PathBuf;
use tempfile::TempDir;

/// A small but realistic export: 20 top-level elements, two nights of sleep
/// from several sources, a workout with nested data and a correlation with
/// nested records.
pub(crate) const SAMPLE_EXPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE HealthData [
<!ELEMENT HealthData (ExportDate,Me,(Record|Correlation|Workout|ActivitySummary)*)>
<!ATTLIST HealthData locale CDATA #REQUIRED>
]>
<HealthData locale="en_US">
 <ExportDate value="2024-01-22 09:00:00 -0700"/>
 <Me HKCharacteristicTypeIdentifierDateOfBirth="1990-01-01" HKCharacteristicTypeIdentifierBiologicalSex="HKBiologicalSexFemale"/>
 <Record type="HKQuantityTypeIdentifierStepCount" sourceName="iPhone" unit="count" creationDate="2024-01-20 08:06:00 -0700" startDate="2024-01-20 08:00:00 -0700" endDate="2024-01-20 08:05:00 -0700" value="100">
  <MetadataEntry key="HKTimeZone" value="America/Denver"/>
 </Record>
 <Record type="HKQuantityTypeIdentifierHeartRate" sourceName="Apple Watch" unit="count/min" startDate="2024-01-20 09:00:00 -0700" endDate="2024-01-20 09:00:00 -0700" value="72"/>
 <Record type="HKQuantityTypeIdentifierHeartRate" sourceName="Apple Watch" unit="count/min" startDate="2024-01-20 12:00:00 -0700" endDate="2024-01-20 12:00:00 -0700" value="88"/>
 <Record type="HKQuantityTypeIdentifierHeartRate" sourceName="Apple Watch" unit="count/min" startDate="2024-01-21 07:30:00 -0700" endDate="2024-01-21 07:30:00 -0700" value="65"/>
 <Record type="HKQuantityTypeIdentifierBodyMass" sourceName="Scale" unit="kg" value="70"/>
 <Record type="HKCategoryTypeIdentifierSleepAnalysis" sourceName="iPhone" startDate="2024-01-20 22:30:00 -0700" endDate="2024-01-21 06:30:00 -0700" value="HKCategoryValueSleepAnalysisInBed"/>
 <Record type="HKCategoryTypeIdentifierSleepAnalysis" sourceName="Apple Watch" startDate="2024-01-20 23:00:00 -0700" endDate="2024-01-21 01:00:00 -0700" value="HKCategoryValueSleepAnalysisAsleepCore">
  <MetadataEntry key="HKTimeZone" value="America/Denver"/>
 </Record>
 <Record type="HKCategoryTypeIdentifierSleepAnalysis" sourceName="Apple Watch" startDate="2024-01-21 00:30:00 -0700" endDate="2024-01-21 01:30:00 -0700" value="HKCategoryValueSleepAnalysisAsleepDeep">
  <MetadataEntry key="HKTimeZone" value="America/Denver"/>
  <MetadataEntry key="SleepAlgorithmVersion" value="2"/>
 </Record>
 <Record type="HKCategoryTypeIdentifierSleepAnalysis" sourceName="Apple Watch" startDate="2024-01-21 01:30:00 -0700" endDate="2024-01-21 01:33:00 -0700" value="HKCategoryValueSleepAnalysisAwake"/>
 <Record type="HKCategoryTypeIdentifierSleepAnalysis" sourceName="Apple Watch" startDate="2024-01-21 01:33:00 -0700" endDate="2024-01-21 03:00:00 -0700" value="HKCategoryValueSleepAnalysisAsleepREM"/>
 <Record type="HKCategoryTypeIdentifierSleepAnalysis" sourceName="Apple Watch" startDate="2024-01-21 03:00:00 -0700" endDate="2024-01-21 06:00:00 -0700" value="HKCategoryValueSleepAnalysisAsleepCore"/>
 <Record type="HKCategoryTypeIdentifierSleepAnalysis" sourceName="Apple Watch" startDate="2024-01-21 06:00:00 -0700" endDate="2024-01-21 06:01:00 -0700" value="HKCategoryValueSleepAnalysisAwake"/>
 <Record type="HKCategoryTypeIdentifierSleepAnalysis" sourceName="Sleep App" startDate="2024-01-21 23:15:00 -0700" endDate="2024-01-22 02:00:00 -0700" value="HKCategoryValueSleepAnalysisAsleepUnspecified"/>
 <Record type="HKCategoryTypeIdentifierSleepAnalysis" sourceName="Sleep App" startDate="2024-01-22 02:00:00 -0700" endDate="2024-01-22 02:00:00 -0700" value="HKCategoryValueSleepAnalysisAsleepCore"/>
 <Record type="HKCategoryTypeIdentifierSleepAnalysis" sourceName="Sleep App" startDate="2024-01-22 02:30:00 -0700" endDate="2024-01-22 05:00:00 -0700" value="HKCategoryValueSleepAnalysisAsleep"/>
 <Workout workoutActivityType="HKWorkoutActivityTypeRunning" duration="45" durationUnit="min" sourceName="Apple Watch" startDate="2024-01-20 17:00:00 -0700" endDate="2024-01-20 17:45:00 -0700">
  <MetadataEntry key="HKIndoorWorkout" value="0"/>
  <WorkoutEvent type="HKWorkoutEventTypePause" date="2024-01-20 17:20:00 -0700"/>
  <WorkoutEvent type="HKWorkoutEventTypeResume" date="2024-01-20 17:22:00 -0700"/>
  <WorkoutStatistics type="HKQuantityTypeIdentifierActiveEnergyBurned" startDate="2024-01-20 17:00:00 -0700" endDate="2024-01-20 17:45:00 -0700" sum="410" unit="Cal"/>
  <WorkoutRoute sourceName="Apple Watch" startDate="2024-01-20 17:00:00 -0700" endDate="2024-01-20 17:45:00 -0700">
   <MetadataEntry key="HKMetadataKeySyncVersion" value="2"/>
   <FileReference path="/workout-routes/route_2024-01-20.gpx"/>
  </WorkoutRoute>
 </Workout>
 <Correlation type="HKCorrelationTypeIdentifierBloodPressure" sourceName="Cuff" startDate="2024-01-21 08:00:00 -0700" endDate="2024-01-21 08:00:00 -0700">
  <Record type="HKQuantityTypeIdentifierBloodPressureSystolic" unit="mmHg" startDate="2024-01-21 08:00:00 -0700" endDate="2024-01-21 08:00:00 -0700" value="120"/>
  <Record type="HKQuantityTypeIdentifierBloodPressureDiastolic" unit="mmHg" startDate="2024-01-21 08:00:00 -0700" endDate="2024-01-21 08:00:00 -0700" value="80"/>
 </Correlation>
 <ActivitySummary dateComponents="2024-01-20" activeEnergyBurned="450" activeEnergyBurnedGoal="500" appleExerciseTime="45"/>
</HealthData>
"#;

/// Number of direct children of the root in [`SAMPLE_EXPORT`]
pub(crate) const SAMPLE_TOP_LEVEL_COUNT: usize = 20;

/// Write `contents` to `export.xml` in a fresh temp dir
pub(crate) fn write_export(contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.xml");
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}

pub(crate) fn write_sample() -> (TempDir, PathBuf) {
    write_export(SAMPLE_EXPORT)
}
