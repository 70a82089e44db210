/*!

This is the long-form manual for `survey_metrics` and `surveytab`.

## Instruments

Each survey version is described by an [`Instrument`](crate::Instrument): the field codes of the
questionnaire, how each field is validated, and the named quantities (metrics) derived from them.
The following instruments are built in (see [`instruments`](crate::instruments)):

* `asean` The questionnaire shared by the ASEAN countries. All the countries are in one dataset,
  the country of a respondent is in the `HQ_COUNTRY` field.
* `hong_kong` The Hong Kong questionnaire, numbered `B9_*` (health, technology) and `B10_*` (wellbeing).
* `hong_kong_dementia` The Hong Kong questionnaire on AI in dementia care (`C*`) and dementia knowledge (`D*`).

### Metrics

* `Field`: the value of one field, for example `general_health` is `B3` in the ASEAN questionnaire.
* `Composite`: the mean of a fixed group of Likert items. The wellbeing items follow the mental health
  continuum: items 1-3 are emotional wellbeing, 4-8 social wellbeing and 9-14 psychological wellbeing.
  A composite score has no value if one of its items is not answered.
* `Bmi`: the weight in kilograms divided by the square of the height in metres. Heights are recorded
  in centimetres.
* `Knowledge`: each statement scores 4 points when answered correctly, 2.5 points for "don't know" and
  nothing otherwise. The total is brought to a 0-100 scale. Answering "don't know" everywhere gives 62.5.

## Validation

Records are validated when a dataset is loaded:
* a required field without an answer is *missing*
* a Likert or numeric field must hold a number within its bounds
* a categorical field must hold one of its codes

With the `failFast` policy, the first invalid record stops the processing. With the `flag` policy,
the invalid records are logged, left out of all the statistics and counted in the `rejected` entry
of the summary.

## Summaries

For each region, the summary contains:
* `participants` the number of valid respondents
* `averageUsageHours` and `averageWellbeing` the headline averages
* `distribution` the number of respondents for each answer of a categorical question
* `indicators` the percentage of respondents at or above a threshold (for example good health is
  general health of 4 or more)
* `metrics` the averages of the other reported metrics
* `crossTabs` a metric averaged within the buckets of a demographic dimension (age band, income band,
  BMI category)

Averages and percentages are rounded to two decimals. When no respondent contributes to a value,
this value is `null`. All the buckets of a dimension are reported, including the empty ones.

## Input formats

The following formats are supported by `surveytab`:
* `json` An array of flat objects, one per respondent.
* `csv` A header row with the field codes, then one row per respondent.
* `xlsx` An Excel spreadsheet, with the field codes in the first row.

Empty values are treated as missing answers.

## Configuration

```json
{
  "outputSettings": { "dashboardName": "Health technology survey" },
  "sources": [
    { "provider": "json", "filePath": "asean.json", "instrument": "asean", "splitByCountry": true },
    { "provider": "csv", "filePath": "hong_kong.csv", "instrument": "hong_kong", "region": "Hong Kong" }
  ],
  "rules": { "validation": "flag" }
}
```

The paths are relative to the directory of the configuration file. A source of a shared dataset can be
restricted to one country with `countryCode`, or split into one summary per country with `splitByCountry`.
When splitting, a country whose records were all rejected still has a summary, and the rejected records
without a country are counted in a last summary named `Unattributed`.

*/
